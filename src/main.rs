use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use subtrack::config::Settings;
use subtrack::format::{FormatRegistry, ParseContext};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about = "Subtitle track conversion with dialect auto-detection")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the input's dialect and convert it to another one
    Convert {
        /// Input subtitle file
        input: PathBuf,

        /// Output file (defaults to input name with the target extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target dialect name, e.g. "SubRip" or "WebVTT"
        #[arg(short, long, default_value = "SubRip")]
        to: String,

        /// Frame rate for frame-based inputs
        #[arg(long)]
        frame_rate: Option<f64>,

        /// Shift all cues by this many milliseconds
        #[arg(long, default_value = "0")]
        offset_ms: f64,

        /// Round cue boundaries to whole seconds
        #[arg(long)]
        round_seconds: bool,
    },

    /// Report which dialect the input is and how cleanly it parses
    Detect {
        /// Input subtitle file
        input: PathBuf,

        /// Frame rate for frame-based inputs
        #[arg(long)]
        frame_rate: Option<f64>,
    },

    /// List the supported dialects in detection order
    Formats,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn parse_context(path: &Path, frame_rate: Option<f64>, settings: &Settings) -> ParseContext {
    ParseContext::new(frame_rate.unwrap_or(settings.current_frame_rate))
        .with_file_name(path.to_string_lossy())
}

fn derive_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!(
        "{}{}",
        stem.to_string_lossy(),
        extension
    ));
    output
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = Settings::load().unwrap_or_default();
    let registry = FormatRegistry::default();

    match cli.command {
        Command::Convert {
            input,
            output,
            to,
            frame_rate,
            offset_ms,
            round_seconds,
        } => {
            let lines = read_lines(&input)?;
            let ctx = parse_context(&input, frame_rate, &settings);
            let detected = registry
                .detect_and_load(&lines, &ctx, None)
                .with_context(|| format!("Failed to parse {}", input.display()))?;
            if detected.error_count > 0 {
                info!(
                    error_count = detected.error_count,
                    "some lines could not be parsed and were skipped"
                );
            }

            let target = registry
                .find_by_name(&to)
                .ok_or_else(|| anyhow::anyhow!("Unknown format: {}", to))?;

            let mut track = detected.track;
            if offset_ms != 0.0 {
                track.add_time_to_all_cues(offset_ms);
            }

            let title = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let rendered = target.render(&track, &title, round_seconds);

            let output = output.unwrap_or_else(|| derive_output_path(&input, target.extension()));
            std::fs::write(&output, rendered)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                from = %detected.format_name,
                to = target.name(),
                cues = track.cues.len(),
                output = %output.display(),
                "conversion complete"
            );
        }

        Command::Detect { input, frame_rate } => {
            let lines = read_lines(&input)?;
            let ctx = parse_context(&input, frame_rate, &settings);
            let detected = registry
                .detect_and_load(&lines, &ctx, None)
                .with_context(|| format!("Failed to parse {}", input.display()))?;
            println!(
                "{}: {} ({} cues, {} bad lines)",
                input.display(),
                detected.format_name,
                detected.track.cues.len(),
                detected.error_count
            );
        }

        Command::Formats => {
            for format in registry.formats() {
                println!("{}", format.friendly_name());
            }
        }
    }

    Ok(())
}
