//! Batch validation of a composition before any command is built.
//!
//! Every check runs even when earlier ones fail, so one pass reports every
//! defect. Messages come out in check order, then input order.

use std::path::Path;

use crate::{
    assets::{AssetLookup, PackSelection},
    fs::FileSystem,
    segment::segment,
    timeline, AppConfig,
};

pub struct Validator<F> {
    fs: F,
}

impl<F: FileSystem> Validator<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Returns one message per defect; an empty list means the composition
    /// can be built.
    pub fn validate(
        &self,
        workdir: &Path,
        config: &AppConfig,
        selection: &PackSelection,
        resolver: Option<&dyn AssetLookup>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        for rel in [&config.inputs.background, &config.inputs.audio] {
            let path = workdir.join(rel);
            if !self.fs.exists(&path) {
                errors.push(format!("Missing required input file: {}", path.display()));
            }
        }

        if let Some(dir) = selection.active_override(workdir, config) {
            if !self.fs.exists(&dir) {
                errors.push(format!("Emoji override dir not found: {}", dir.display()));
            }
        } else {
            let bundled = selection.bundled_dir();
            if !self.fs.exists(&bundled) {
                errors.push(format!(
                    "Bundled emoji pack folder is missing: {}",
                    bundled.display()
                ));
            }
        }

        errors.extend(
            timeline::timing_issues(&config.cues)
                .into_iter()
                .map(|issue| issue.to_string()),
        );

        if let Some(resolver) = resolver {
            for (index, cue) in config.cues.iter().enumerate() {
                for cluster in segment(&cue.text) {
                    if let Err(err) = resolver.resolve(&cluster) {
                        errors.push(format!("Cue #{index} missing emoji asset: {err}"));
                    }
                }
            }
        }

        tracing::debug!(errors = errors.len(), "validation finished");
        errors
    }
}
