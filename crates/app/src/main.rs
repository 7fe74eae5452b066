use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use emoji_overlay_core::{
    build_command, to_shell, AppConfig, AssetResolver, FfmpegRunner, LocalFileSystem,
    PackSelection, Recorder, ShellStyle, Validator,
};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_VALIDATION: u8 = 2;

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (command, args) = match cli.command {
        Commands::Build(args) => (Action::Build, args),
        Commands::Validate(args) => (Action::Validate, args),
        Commands::Probe(args) => (Action::Probe, args),
    };

    let workdir = std::path::absolute(&args.workdir)
        .with_context(|| format!("resolve workdir '{}'", args.workdir.display()))?;
    let config = AppConfig::load(&workdir)?;

    let emoji_dir = emoji_dir(args.emoji_dir.as_deref()).context("resolve emoji dir")?;
    let selection = PackSelection::new(
        assets_root(args.assets_root.as_deref()),
        args.emoji_pack,
        emoji_dir,
        &config,
    );
    tracing::debug!(
        workdir = %workdir.display(),
        pack = %selection.pack_id,
        assets_root = %selection.assets_root.display(),
        "resolved inputs"
    );

    let resolver = AssetResolver::from_selection(&selection, &workdir, &config);
    let errors =
        Validator::new(LocalFileSystem).validate(&workdir, &config, &selection, Some(&resolver));
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("{error}");
        }
        return Ok(ExitCode::from(EXIT_VALIDATION));
    }

    let ffmpeg = build_command(&workdir, &config, &resolver)?;

    match command {
        Action::Validate => {
            tracing::info!("Validation passed.");
            Ok(ExitCode::SUCCESS)
        }
        Action::Probe => {
            println!("{}", to_shell(&ffmpeg, ShellStyle::native()));
            Ok(ExitCode::SUCCESS)
        }
        Action::Build if args.dry_run => {
            println!("{}", to_shell(&ffmpeg, ShellStyle::native()));
            Ok(ExitCode::SUCCESS)
        }
        Action::Build => {
            let output = workdir.join(&config.output.file);
            let code = Recorder::new(LocalFileSystem, FfmpegRunner).record(&ffmpeg, &output)?;
            Ok(exit_code(code))
        }
    }
}

/// `--assets-root`/`EMOJI_VIDEO_ASSETS_ROOT`, else `assets` next to the binary.
fn assets_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// `--emoji-dir` made absolute; an empty value means no override.
fn emoji_dir(arg: Option<&Path>) -> std::io::Result<Option<PathBuf>> {
    arg.filter(|dir| !dir.as_os_str().is_empty())
        .map(std::path::absolute)
        .transpose()
}

fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::from(EXIT_FAILURE),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Build,
    Validate,
    Probe,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Build emoji overlay videos from local assets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the composition and render it with ffmpeg.
    Build(CommonArgs),
    /// Check inputs, cue timing and emoji assets without rendering.
    Validate(CommonArgs),
    /// Print the ffmpeg command that `build` would run.
    Probe(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory holding `config.json` and the inputs it references.
    #[arg(long)]
    workdir: PathBuf,
    /// Emoji pack id, overriding `inputs.emojiPackId`.
    #[arg(long)]
    emoji_pack: Option<String>,
    /// Directory searched for emoji images before the bundled pack.
    #[arg(long)]
    emoji_dir: Option<PathBuf>,
    /// Root directory of the bundled emoji packs.
    #[arg(long, env = "EMOJI_VIDEO_ASSETS_ROOT")]
    assets_root: Option<PathBuf>,
    /// Print the command instead of running it.
    #[arg(long)]
    dry_run: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn emoji_pack_defaults_to_none() {
        let cli = Cli::try_parse_from(["emoji-overlay", "probe", "--workdir", "/tmp/w"]).unwrap();
        let Commands::Probe(args) = cli.command else {
            panic!("expected probe");
        };
        assert!(args.emoji_pack.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_build_flags() {
        let cli = Cli::try_parse_from([
            "emoji-overlay",
            "build",
            "--workdir",
            "w",
            "--emoji-pack",
            "noto-128",
            "--emoji-dir",
            "overrides",
            "--dry-run",
        ])
        .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.emoji_pack.as_deref(), Some("noto-128"));
        assert_eq!(args.emoji_dir, Some(PathBuf::from("overrides")));
        assert!(args.dry_run);
    }

    #[test]
    fn explicit_assets_root_wins() {
        assert_eq!(
            assets_root(Some(Path::new("/opt/assets"))),
            PathBuf::from("/opt/assets")
        );
    }

    #[test]
    fn empty_emoji_dir_means_no_override() {
        assert_eq!(emoji_dir(None).unwrap(), None);
        assert_eq!(emoji_dir(Some(Path::new(""))).unwrap(), None);

        let dir = emoji_dir(Some(Path::new("overrides"))).unwrap().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("overrides"));
    }

    #[test]
    fn out_of_range_exit_codes_collapse_to_failure() {
        assert_eq!(exit_code(0), ExitCode::SUCCESS);
        assert_eq!(exit_code(-1), ExitCode::from(EXIT_FAILURE));
    }
}
