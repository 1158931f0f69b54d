/// Wavpipe - convert decodable audio streams to PCM WAV
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wavpipe_audio::{spawn_decode, SymphoniaBackend};
use wavpipe_cli::{CliConfig, LogSettings, ProgressLine};
use wavpipe_core::DecodeOutcome;

#[derive(Parser)]
#[command(name = "wavpipe")]
#[command(about = "Convert audio streams to uncompressed PCM WAV", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./wavpipe.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert INPUT to a WAV file at OUTPUT
    Decode {
        /// Audio file to decode
        input: PathBuf,
        /// WAV file to create or overwrite
        output: PathBuf,
        /// Frames to convert; -1 converts the whole stream
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        max_samples: Option<i64>,
        /// Output bit depth: 8, 16, 24, or 32 (0 keeps the 16-bit default)
        #[arg(short, long)]
        bits: Option<u32>,
        /// Frames decoded per chunk
        #[arg(long)]
        chunk_frames: Option<usize>,
        /// Print the outcome as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Print the stream properties of INPUT
    Probe {
        /// Audio file to inspect
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.log, cli.verbose);

    match cli.command {
        Commands::Decode {
            input,
            output,
            max_samples,
            bits,
            chunk_frames,
            json,
        } => {
            let settings = config.decode.with_overrides(max_samples, bits, chunk_frames);
            settings.validate()?;
            tracing::debug!(?settings, "Resolved decode settings");
            decode(settings.request(input, output), settings.pipeline_options(), json)?;
        }
        Commands::Probe { input, json } => {
            probe(&input, json)?;
        }
    }

    Ok(())
}

fn init_tracing(log: &LogSettings, verbose: bool) {
    let default_filter = if verbose {
        "wavpipe=debug,wavpipe_cli=debug,wavpipe_audio=debug".to_string()
    } else {
        log.filter.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn decode(
    request: wavpipe_core::DecodeRequest,
    options: wavpipe_audio::PipelineOptions,
    json: bool,
) -> anyhow::Result<()> {
    let job = spawn_decode(request, SymphoniaBackend::new(), options)
        .context("Failed to start decode thread")?;

    let mut line = ProgressLine::new();
    let mut stderr = std::io::stderr();
    for fraction in job.progress().iter() {
        line.update(&mut stderr, fraction)?;
    }
    line.finish(&mut stderr)?;

    let outcome = job.join();
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        DecodeOutcome::Success(summary) => {
            if !json {
                println!(
                    "Wrote {} frames ({} ch, {} Hz, {}-bit, {} bytes)",
                    summary.samples_written,
                    summary.channels,
                    summary.sample_rate,
                    summary.bits_per_sample,
                    summary.bytes_written
                );
            }
            Ok(())
        }
        DecodeOutcome::Failure { kind, message } => {
            tracing::debug!(%kind, code = kind.code(), "Conversion did not succeed");
            bail!("{} (code {})", message, kind.code())
        }
    }
}

fn probe(input: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let properties = wavpipe_audio::probe(input, &SymphoniaBackend::new())?;
    tracing::debug!(input = %input.display(), ?properties, "Probed stream");

    if json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
    } else {
        println!("Channels:        {}", properties.channels);
        println!("Sample rate:     {} Hz", properties.sample_rate);
        println!("Bits per sample: {}", properties.bits_per_sample);
        println!("Total samples:   {}", properties.total_samples);
        println!(
            "Sample format:   {}",
            if properties.is_float { "float" } else { "integer" }
        );
    }

    Ok(())
}
