use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    assets::DEFAULT_PACK_ID,
    timeline::{self, Cue},
    OverlayError, Result,
};

/// File name looked up inside the working directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level configuration structure for a composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub inputs: InputsConfig,
    #[serde(default)]
    pub safe_area: SafeAreaConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

impl AppConfig {
    /// Builds a config with default geometry around `inputs` and `cues`.
    pub fn new(inputs: InputsConfig, mut cues: Vec<Cue>) -> Self {
        timeline::sort_by_start(&mut cues);
        Self {
            inputs,
            safe_area: SafeAreaConfig::default(),
            video: VideoConfig::default(),
            render: RenderConfig::default(),
            layout: LayoutConfig::default(),
            output: OutputConfig::default(),
            cues,
        }
    }

    /// Reads `config.json` from `workdir`. Cues come back sorted by start.
    pub fn load(workdir: &Path) -> Result<Self> {
        let path = workdir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Err(OverlayError::ConfigNotFound { path });
        }

        let raw = std::fs::read_to_string(&path)?;
        let config = Self::from_json_str(&raw)
            .map_err(|source| OverlayError::Config { path, source })?;
        tracing::debug!(cues = config.cues.len(), "loaded config");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(raw)?;
        timeline::sort_by_start(&mut config.cues);
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputsConfig {
    pub background: PathBuf,
    pub audio: PathBuf,
    #[serde(default = "default_pack_id")]
    pub emoji_pack_id: String,
    #[serde(default)]
    pub emoji_override_dir: Option<PathBuf>,
}

impl InputsConfig {
    pub fn new(background: impl Into<PathBuf>, audio: impl Into<PathBuf>) -> Self {
        Self {
            background: background.into(),
            audio: audio.into(),
            emoji_pack_id: default_pack_id(),
            emoji_override_dir: None,
        }
    }
}

fn default_pack_id() -> String {
    DEFAULT_PACK_ID.to_string()
}

/// Horizontal band of the frame reserved for the emoji row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeAreaConfig {
    #[serde(deserialize_with = "truncate_i32")]
    pub width: i32,
    #[serde(deserialize_with = "truncate_i32")]
    pub offset_x: i32,
    #[serde(deserialize_with = "truncate_i32")]
    pub padding_left: i32,
}

impl Default for SafeAreaConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            offset_x: 0,
            padding_left: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    #[serde(deserialize_with = "truncate_u32")]
    pub width: u32,
    #[serde(deserialize_with = "truncate_u32")]
    pub height: u32,
    #[serde(deserialize_with = "truncate_u32")]
    pub fps: u32,
    #[serde(deserialize_with = "truncate_u32")]
    pub crf: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            crf: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// One ffmpeg `overlay` filter per emoji over a looped background.
    #[default]
    FfmpegOverlays,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub tmp_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::FfmpegOverlays,
            tmp_dir: PathBuf::from("out/.tmp_frames"),
        }
    }
}

/// Emoji row geometry. `center_y`, when set, replaces `top_margin` as the
/// vertical anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    #[serde(deserialize_with = "truncate_i32")]
    pub emoji_size: i32,
    #[serde(deserialize_with = "truncate_i32")]
    pub gap: i32,
    #[serde(deserialize_with = "truncate_i32")]
    pub top_margin: i32,
    #[serde(deserialize_with = "truncate_opt_i32")]
    pub center_y: Option<i32>,
    #[serde(deserialize_with = "truncate_i32")]
    pub offset_y: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            emoji_size: 72,
            gap: 8,
            top_margin: 60,
            center_y: None,
            offset_y: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("out/final.mp4"),
        }
    }
}

/// Geometry numbers may be written as floats; they are truncated toward zero.
fn truncate_i32<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i32, D::Error> {
    Ok(f64::deserialize(d)? as i32)
}

fn truncate_u32<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    Ok(f64::deserialize(d)? as u32)
}

fn truncate_opt_i32<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<i32>, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.map(|v| v as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_defaults_for_missing_sections() {
        let config = AppConfig::from_json_str(
            r#"{"inputs": {"background": "background.png", "audio": "audio.wav"}}"#,
        )
        .unwrap();

        assert_eq!(config.inputs.emoji_pack_id, DEFAULT_PACK_ID);
        assert!(config.inputs.emoji_override_dir.is_none());
        assert_eq!(config.safe_area.width, 1000);
        assert_eq!((config.video.width, config.video.height), (1280, 720));
        assert_eq!(config.video.fps, 30);
        assert_eq!(config.render.mode, RenderMode::FfmpegOverlays);
        assert_eq!(config.layout.emoji_size, 72);
        assert_eq!(config.output.file, PathBuf::from("out/final.mp4"));
        assert!(config.cues.is_empty());
    }

    #[test]
    fn reads_camel_case_fields() {
        let config = AppConfig::from_json_str(
            r#"{
                "inputs": {
                    "background": "bg.png",
                    "audio": "a.wav",
                    "emojiPackId": "noto-128",
                    "emojiOverrideDir": "emoji_override"
                },
                "safeArea": {"width": 900, "offsetX": 4, "paddingLeft": 12},
                "layout": {"emojiSize": 64, "centerY": 360, "offsetY": -8},
                "cues": [{"text": "😀", "start": 1, "end": 2, "typingDuration": 0.5}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.inputs.emoji_pack_id, "noto-128");
        assert_eq!(
            config.inputs.emoji_override_dir,
            Some(PathBuf::from("emoji_override"))
        );
        assert_eq!(config.safe_area.padding_left, 12);
        assert_eq!(config.layout.center_y, Some(360));
        assert_eq!(config.layout.gap, 8);
        assert_eq!(config.cues[0].typing_duration, 0.5);
    }

    #[test]
    fn float_geometry_is_truncated() {
        let config = AppConfig::from_json_str(
            r#"{
                "inputs": {"background": "bg.png", "audio": "a.wav"},
                "safeArea": {"width": 1000.0, "offsetX": -4.7},
                "video": {"width": 1280.0, "fps": 29.97},
                "layout": {"emojiSize": 72.9, "centerY": 360.5}
            }"#,
        )
        .unwrap();

        assert_eq!(config.safe_area.width, 1000);
        assert_eq!(config.safe_area.offset_x, -4);
        assert_eq!(config.video.width, 1280);
        assert_eq!(config.video.fps, 29);
        assert_eq!(config.layout.emoji_size, 72);
        assert_eq!(config.layout.center_y, Some(360));
        assert_eq!(config.layout.gap, 8);
    }

    #[test]
    fn null_center_y_means_no_anchor() {
        let config = AppConfig::from_json_str(
            r#"{"inputs": {"background": "bg.png", "audio": "a.wav"}, "layout": {"centerY": null}}"#,
        )
        .unwrap();
        assert_eq!(config.layout.center_y, None);
    }

    #[test]
    fn loader_sorts_cues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{
                "inputs": {"background": "background.png", "audio": "audio.wav"},
                "cues": [
                    {"text": "😀", "start": 2, "end": 3},
                    {"text": "😀", "start": 1, "end": 1.5}
                ]
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).unwrap();
        assert!(config.cues[0].start <= config.cues[1].start);
        assert_eq!(config.cues[0].typing_duration, 0.0);
    }

    #[test]
    fn missing_config_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, OverlayError::ConfigNotFound { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn rejects_missing_required_inputs_and_unknown_modes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"inputs": {"background": "background.png"}}"#,
        )
        .unwrap();
        assert!(matches!(
            AppConfig::load(dir.path()),
            Err(OverlayError::Config { .. })
        ));

        let unknown_mode = AppConfig::from_json_str(
            r#"{"inputs": {"background": "b.png", "audio": "a.wav"}, "render": {"mode": "frames"}}"#,
        );
        assert!(unknown_mode.is_err());
    }
}
