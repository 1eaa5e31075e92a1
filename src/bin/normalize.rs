use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::error;
use std::path::PathBuf;
use std::time::Duration;
use tubegrab::Normalizer;

/// Re-encodes an audio file in place with a fixed bitrate and sample rate.
#[derive(Parser, Clone)]
pub struct Cli {
    /// The audio file to rewrite.
    pub file: PathBuf,

    #[arg(
        long = "bitrate",
        short,
        default_value = "320k",
        value_parser = clap::builder::PossibleValuesParser::new([
            "8k", "16k", "24k", "32k", "40k", "48k", "64k", "80k", "96k", "112k", "128k", "160k", "192k", "224k", "256k", "320k"
        ])
    )]
    pub bitrate: String,

    #[arg(long = "sample-rate", short, default_value_t = 44100)]
    pub sample_rate: u32,

    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    #[arg(
        long = "verbosity",
        short,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Cli::parse();

    let filter = match args.verbosity.as_str() {
        "debug" => log::LevelFilter::Debug,
        "error" => log::LevelFilter::Error,
        "none" => log::LevelFilter::Off,
        "full" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };
    let logger = env_logger::Builder::new().filter_level(filter).build();
    let progress = MultiProgress::new();
    LogWrapper::new(progress.clone(), logger).try_init()?;

    let spinner = progress.add(ProgressBar::new_spinner());
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Transcoding {}...", args.file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let normalizer = Normalizer::new(args.ffmpeg);
    let result = normalizer
        .normalize(&args.file, &args.bitrate, args.sample_rate)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            println!("File modified: {}", args.file.display());
            Ok(())
        }
        Err(error) => {
            error!("Transcoding failed: {error}");
            std::process::exit(1);
        }
    }
}
