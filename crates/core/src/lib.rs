//! Core library for the emoji overlay video builder.
//!
//! A composition is a background still, an audio track and a list of timed
//! cues whose text is a row of emoji. The crate splits cue text into emoji
//! clusters, resolves each one to an image, validates the whole setup in one
//! pass and turns it into a single deterministic ffmpeg command that overlays
//! every emoji with a typing-reveal gate. Running ffmpeg is left to a
//! [`ProcessRunner`].

pub mod assets;
pub mod config;
pub mod error;
pub mod fs;
pub mod layout;
pub mod record;
pub mod render;
pub mod segment;
pub mod timeline;
pub mod validate;

pub use assets::{bundled_pack_dir, AssetKey, AssetLookup, AssetResolver, PackSelection};
pub use config::{
    AppConfig, InputsConfig, LayoutConfig, OutputConfig, RenderConfig, RenderMode,
    SafeAreaConfig, VideoConfig,
};
pub use error::{OverlayError, Result};
pub use fs::{FileSystem, LocalFileSystem};
pub use record::{to_shell, FfmpegRunner, ProcessRunner, Recorder, ShellStyle};
pub use render::{build_command, RenderGraph};
pub use segment::{segment, EmojiCluster};
pub use timeline::{Cue, TimingIssue};
pub use validate::Validator;
