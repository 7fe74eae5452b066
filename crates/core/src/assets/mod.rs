use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    segment::{EmojiCluster, VARIATION_SELECTOR_16},
    AppConfig, OverlayError, Result,
};

/// Pack identifier used when neither the config nor the CLI names one.
pub const DEFAULT_PACK_ID: &str = "twemoji-72x72";

const IMAGE_EXTENSION: &str = ".png";

/// Canonical file name of an emoji image, e.g. `1f44d-1f3fd.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey(String);

impl AssetKey {
    /// Joins the lower-case hex code points of `cluster` with `-`.
    ///
    /// U+FE0F is left out so `❤️` and `❤` share one image.
    pub fn from_cluster(cluster: &EmojiCluster) -> Self {
        let points: Vec<String> = cluster
            .chars()
            .filter(|&c| c != VARIATION_SELECTOR_16)
            .map(|c| format!("{:x}", u32::from(c)))
            .collect();
        Self(format!("{}{IMAGE_EXTENSION}", points.join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory holding the images of a bundled pack below `assets_root`.
///
/// `twemoji-72x72` maps to `emoji/twemoji/72x72`; any other id containing a
/// `-` is split once into family and size; everything else is a single
/// directory under `emoji/`.
pub fn bundled_pack_dir(assets_root: &Path, pack_id: &str) -> PathBuf {
    let emoji_root = assets_root.join("emoji");
    if pack_id == DEFAULT_PACK_ID {
        return emoji_root.join("twemoji").join("72x72");
    }

    match pack_id.split_once('-') {
        Some((family, size)) => emoji_root.join(family).join(size),
        None => emoji_root.join(pack_id),
    }
}

/// Asset choices made on the command line, layered over the config.
#[derive(Debug, Clone)]
pub struct PackSelection {
    pub assets_root: PathBuf,
    pub pack_id: String,
    /// Override directory given explicitly, taking precedence over
    /// `inputs.emojiOverrideDir`.
    pub explicit_override: Option<PathBuf>,
}

impl PackSelection {
    /// Builds a selection, falling back to the config's pack id.
    pub fn new(
        assets_root: impl Into<PathBuf>,
        pack_id: Option<String>,
        explicit_override: Option<PathBuf>,
        config: &AppConfig,
    ) -> Self {
        Self {
            assets_root: assets_root.into(),
            pack_id: pack_id.unwrap_or_else(|| config.inputs.emoji_pack_id.clone()),
            explicit_override,
        }
    }

    /// Override directory from the config, resolved against `workdir`.
    pub fn configured_override(workdir: &Path, config: &AppConfig) -> Option<PathBuf> {
        config
            .inputs
            .emoji_override_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| workdir.join(dir))
    }

    /// The override directory actually in effect, if any.
    pub fn active_override(&self, workdir: &Path, config: &AppConfig) -> Option<PathBuf> {
        self.explicit_override
            .clone()
            .or_else(|| Self::configured_override(workdir, config))
    }

    pub fn bundled_dir(&self) -> PathBuf {
        bundled_pack_dir(&self.assets_root, &self.pack_id)
    }
}

/// Maps an emoji cluster to an image on disk.
pub trait AssetLookup {
    fn resolve(&self, cluster: &EmojiCluster) -> Result<PathBuf>;
}

/// Resolves emoji images from an optional override directory, then from the
/// bundled pack.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    assets_root: PathBuf,
    pack_id: String,
    override_dir: Option<PathBuf>,
}

impl AssetResolver {
    pub fn new(
        assets_root: impl Into<PathBuf>,
        pack_id: impl Into<String>,
        override_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            assets_root: assets_root.into(),
            pack_id: pack_id.into(),
            override_dir,
        }
    }

    pub fn from_selection(selection: &PackSelection, workdir: &Path, config: &AppConfig) -> Self {
        Self::new(
            selection.assets_root.clone(),
            selection.pack_id.clone(),
            selection.active_override(workdir, config),
        )
    }

    pub fn pack_dir(&self) -> PathBuf {
        bundled_pack_dir(&self.assets_root, &self.pack_id)
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }
}

impl AssetLookup for AssetResolver {
    fn resolve(&self, cluster: &EmojiCluster) -> Result<PathBuf> {
        let key = AssetKey::from_cluster(cluster);

        if let Some(dir) = &self.override_dir {
            let candidate = dir.join(key.as_str());
            if candidate.exists() {
                tracing::debug!(%key, path = %candidate.display(), "resolved from override");
                return Ok(candidate);
            }
        }

        let bundled = self.pack_dir().join(key.as_str());
        if bundled.exists() {
            tracing::debug!(%key, path = %bundled.display(), "resolved from bundled pack");
            return Ok(bundled);
        }

        Err(OverlayError::AssetNotFound {
            cluster: cluster.to_string(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::segment::segment;

    fn cluster(text: &str) -> EmojiCluster {
        segment(text).remove(0)
    }

    #[test]
    fn encodes_hex_code_points() {
        assert_eq!(AssetKey::from_cluster(&cluster("😀")).as_str(), "1f600.png");
        assert_eq!(
            AssetKey::from_cluster(&cluster("👍🏽")).as_str(),
            "1f44d-1f3fd.png"
        );
        assert_eq!(
            AssetKey::from_cluster(&cluster("👩\u{200D}💻")).as_str(),
            "1f469-200d-1f4bb.png"
        );
    }

    #[test]
    fn variation_selector_does_not_change_key() {
        let with = AssetKey::from_cluster(&cluster("❤\u{FE0F}"));
        let without = AssetKey::from_cluster(&cluster("❤"));
        assert_eq!(with, without);
        assert_eq!(with.as_str(), "2764.png");
        assert_eq!(
            AssetKey::from_cluster(&cluster("1\u{FE0F}\u{20E3}")).as_str(),
            "31-20e3.png"
        );
    }

    #[test]
    fn distinct_sequences_get_distinct_keys() {
        let keys: Vec<AssetKey> = ["👍", "👍🏽", "👍🏿", "🇯🇵", "🇫🇷"]
            .iter()
            .map(|text| AssetKey::from_cluster(&cluster(text)))
            .collect();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn derives_bundled_pack_dirs() {
        let root = Path::new("/assets");
        assert_eq!(
            bundled_pack_dir(root, "twemoji-72x72"),
            Path::new("/assets/emoji/twemoji/72x72")
        );
        assert_eq!(
            bundled_pack_dir(root, "noto-128-color"),
            Path::new("/assets/emoji/noto/128-color")
        );
        assert_eq!(
            bundled_pack_dir(root, "openmoji"),
            Path::new("/assets/emoji/openmoji")
        );
    }

    #[test]
    fn configured_override_is_resolved_against_workdir() {
        let mut config = AppConfig::new(crate::InputsConfig::new("bg.png", "a.wav"), vec![]);
        let workdir = Path::new("/work");
        assert_eq!(PackSelection::configured_override(workdir, &config), None);

        config.inputs.emoji_override_dir = Some(PathBuf::new());
        assert_eq!(PackSelection::configured_override(workdir, &config), None);

        config.inputs.emoji_override_dir = Some(PathBuf::from("emoji_override"));
        let selection = PackSelection::new("/assets", None, None, &config);
        assert_eq!(
            selection.active_override(workdir, &config),
            Some(PathBuf::from("/work/emoji_override"))
        );

        let explicit = PackSelection::new("/assets", None, Some("/cli".into()), &config);
        assert_eq!(
            explicit.active_override(workdir, &config),
            Some(PathBuf::from("/cli"))
        );
    }

    #[test]
    fn override_wins_over_bundled_copy() {
        let root = tempfile::tempdir().unwrap();
        let bundled = bundled_pack_dir(root.path(), DEFAULT_PACK_ID);
        let overrides = root.path().join("override");
        fs::create_dir_all(&bundled).unwrap();
        fs::create_dir_all(&overrides).unwrap();
        fs::write(bundled.join("1f600.png"), b"bundled").unwrap();
        fs::write(overrides.join("1f600.png"), b"override").unwrap();

        let resolver = AssetResolver::new(root.path(), DEFAULT_PACK_ID, Some(overrides.clone()));
        let path = resolver.resolve(&cluster("😀")).unwrap();
        assert_eq!(path, overrides.join("1f600.png"));
    }

    #[test]
    fn falls_back_to_bundled_pack() {
        let root = tempfile::tempdir().unwrap();
        let bundled = bundled_pack_dir(root.path(), DEFAULT_PACK_ID);
        let overrides = root.path().join("override");
        fs::create_dir_all(&bundled).unwrap();
        fs::create_dir_all(&overrides).unwrap();
        fs::write(bundled.join("2764.png"), b"bundled").unwrap();

        let resolver = AssetResolver::new(root.path(), DEFAULT_PACK_ID, Some(overrides));
        let path = resolver.resolve(&cluster("❤\u{FE0F}")).unwrap();
        assert_eq!(path, bundled.join("2764.png"));
    }

    #[test]
    fn reports_missing_asset_key() {
        let root = tempfile::tempdir().unwrap();
        let resolver = AssetResolver::new(root.path(), "openmoji", None);

        let err = resolver.resolve(&cluster("😎")).unwrap_err();
        match &err {
            OverlayError::AssetNotFound { key, .. } => assert_eq!(key.as_str(), "1f60e.png"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("1f60e.png"));
    }
}
