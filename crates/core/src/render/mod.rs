//! Synthesis of the ffmpeg command that composites emoji over the background.

use std::path::Path;

use crate::{
    assets::AssetLookup,
    config::VideoConfig,
    layout,
    segment::segment,
    timeline::Cue,
    AppConfig, Result,
};

const FFMPEG: &str = "ffmpeg";
const AUDIO_BITRATE: &str = "192k";
/// Floor for the typing duration inside reveal expressions, keeping the
/// division defined for ffmpeg.
const MIN_TYPING_SECONDS: f64 = 0.001;

/// Filter graph under construction. Node names are derived from input
/// indices, so the same config always yields the same graph text.
#[derive(Debug)]
pub struct RenderGraph {
    inputs: Vec<String>,
    steps: Vec<String>,
    current: String,
    next_input: usize,
}

impl RenderGraph {
    /// Starts the graph from a looped still background and an audio track,
    /// inputs `0` and `1`.
    pub fn new(background: &Path, audio: &Path, video: &VideoConfig) -> Self {
        let inputs = vec![
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            background.display().to_string(),
            "-i".to_string(),
            audio.display().to_string(),
        ];
        Self {
            inputs,
            steps: vec![format!("[0:v]scale={}:{}[v0]", video.width, video.height)],
            current: "v0".to_string(),
            next_input: 2,
        }
    }

    /// Adds `image` as a new input and overlays it on the accumulated video,
    /// gated by `enable`.
    pub fn overlay(&mut self, image: &Path, size: i32, x: i32, y: i32, enable: &str) {
        let index = self.next_input;
        self.inputs.extend([
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            image.display().to_string(),
        ]);

        let scaled = format!("e{index}");
        let next = format!("v{index}");
        self.steps.push(format!("[{index}:v]scale={size}:{size}[{scaled}]"));
        self.steps.push(format!(
            "[{}][{scaled}]overlay={x}:{y}:enable='{enable}'[{next}]",
            self.current
        ));

        self.current = next;
        self.next_input += 1;
    }

    pub fn filter_complex(&self) -> String {
        self.steps.join(";")
    }

    /// Maps the last video node and the audio input to `output`.
    pub fn into_args(self, video: &VideoConfig, output: &Path) -> Vec<String> {
        let filter = self.filter_complex();
        let map = format!("[{}]", self.current);
        let fps = video.fps.to_string();
        let crf = video.crf.to_string();

        let mut args = vec![FFMPEG.to_string(), "-y".to_string()];
        args.extend(self.inputs);
        args.extend(
            [
                "-filter_complex",
                filter.as_str(),
                "-map",
                map.as_str(),
                "-map",
                "1:a:0",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-r",
                fps.as_str(),
                "-crf",
                crf.as_str(),
                "-c:a",
                "aac",
                "-b:a",
                AUDIO_BITRATE,
                "-shortest",
            ]
            .map(str::to_string),
        );
        args.push(output.display().to_string());
        args
    }
}

/// Visibility expression for the emoji at `index` of `total` within `cue`.
///
/// With a typing duration the emoji waits until the scaled reveal progress
/// reaches its index, so lower indices never appear after higher ones.
pub fn reveal_gate(cue: &Cue, index: usize, total: usize) -> String {
    let window = format!("between(t,{},{})", cue.start, cue.end);
    if cue.typing_duration > 0.0 && total > 0 {
        let progress = format!(
            "({total}*(t-{})/max({},{MIN_TYPING_SECONDS}))",
            cue.start, cue.typing_duration
        );
        format!("{window}*gte({progress},{index})")
    } else {
        window
    }
}

/// Builds the full ffmpeg argument list for `config`.
///
/// Validation must have passed; a missing asset is returned as an error
/// rather than skipped.
pub fn build_command(
    workdir: &Path,
    config: &AppConfig,
    resolver: &dyn AssetLookup,
) -> Result<Vec<String>> {
    let mut graph = RenderGraph::new(
        &workdir.join(&config.inputs.background),
        &workdir.join(&config.inputs.audio),
        &config.video,
    );

    let x0 = layout::start_x(config.video.width, &config.safe_area);
    let y0 = layout::top_y(config.video.height, &config.layout);

    for cue in &config.cues {
        let clusters = segment(&cue.text);
        let total = clusters.len();
        for (index, cluster) in clusters.iter().enumerate() {
            let image = resolver.resolve(cluster)?;
            let x = layout::emoji_x(x0, index, &config.layout);
            graph.overlay(
                &image,
                config.layout.emoji_size,
                x,
                y0,
                &reveal_gate(cue, index, total),
            );
        }
    }

    let output = workdir.join(&config.output.file);
    tracing::debug!(inputs = graph.next_input, "built filter graph");
    Ok(graph.into_args(&config.video, &output))
}
