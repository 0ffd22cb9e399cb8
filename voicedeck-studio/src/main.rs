//! VoiceDeck Studio - Main entry point
//!
//! `serve` runs the HTTP studio; `render` synthesizes texts straight to WAV
//! files; `devices` lists audio outputs.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voicedeck_common::config::{TomlConfig, API_KEY_ENV};
use voicedeck_common::voices::find_voice;
use voicedeck_common::WavHeader;
use voicedeck_studio::audio::{CpalOutput, SharedOutput};
use voicedeck_studio::generation::render_all;
use voicedeck_studio::state::StudioState;
use voicedeck_studio::synthesis::{
    GeminiConfig, GeminiSynthesizer, SpeechSynthesizer, UnconfiguredSynthesizer,
};

/// Command-line arguments for voicedeck-studio
#[derive(Parser, Debug)]
#[command(name = "voicedeck-studio")]
#[command(about = "Multi-entry text-to-speech studio")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Speech service API key (overrides environment and config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP studio service
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "VOICEDECK_PORT")]
        port: Option<u16>,

        /// Audio output device name (default device if omitted)
        #[arg(long)]
        device: Option<String>,
    },

    /// Synthesize each TEXT into entry-N.wav under the output directory
    Render {
        /// Voice to use (configured default voice if omitted)
        #[arg(long)]
        voice: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Print the header of every written file
        #[arg(long)]
        inspect: bool,

        /// Texts to synthesize, one file each
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// List audio output devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging settings live in the config, so the source is logged once tracing is up
    let (config, source) =
        TomlConfig::locate(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config)?;
    source.log();

    match args.command {
        Command::Serve { port, device } => {
            serve(&config, args.api_key.as_deref(), port, device).await
        }
        Command::Render {
            voice,
            out,
            inspect,
            texts,
        } => render(&config, args.api_key.as_deref(), voice, &out, inspect, texts).await,
        Command::Devices => {
            for name in CpalOutput::list_devices().context("Failed to list audio devices")? {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &TomlConfig) -> Result<()> {
    let level = &config.logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "voicedeck_studio={level},voicedeck_common={level},tower_http=debug",
            level = level
        )
        .into()
    });

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn build_synthesizer(
    config: &TomlConfig,
    cli_api_key: Option<&str>,
) -> Result<Option<Arc<dyn SpeechSynthesizer>>> {
    match config.resolve_api_key(cli_api_key) {
        Some(key) => {
            let synth = GeminiSynthesizer::new(GeminiConfig::from_toml(config, key))
                .context("Failed to create speech service client")?;
            info!(endpoint = synth.endpoint(), "Speech service client ready");
            Ok(Some(Arc::new(synth)))
        }
        None => Ok(None),
    }
}

async fn serve(
    config: &TomlConfig,
    cli_api_key: Option<&str>,
    port: Option<u16>,
    device: Option<String>,
) -> Result<()> {
    let port = port.unwrap_or(config.port);
    info!("Starting VoiceDeck Studio on port {}", port);

    let synthesizer = match build_synthesizer(config, cli_api_key)? {
        Some(synth) => synth,
        None => {
            warn!(
                "No API key configured (--api-key, {} or api_key in config); generation will fail",
                API_KEY_ENV
            );
            Arc::new(UnconfiguredSynthesizer::new(format!(
                "set {} or api_key in the config file",
                API_KEY_ENV
            )))
        }
    };

    let output = Arc::new(SharedOutput::cpal(device));
    let state = Arc::new(
        StudioState::new(synthesizer, Arc::clone(&output), &config.default_voice)
            .context("Failed to initialize studio state")?,
    );

    let result = voicedeck_studio::api::run(port, state).await;
    output.shutdown();
    result.context("HTTP server failed")
}

async fn render(
    config: &TomlConfig,
    cli_api_key: Option<&str>,
    voice: Option<String>,
    out: &Path,
    inspect: bool,
    texts: Vec<String>,
) -> Result<()> {
    let voice_id = voice.unwrap_or_else(|| config.default_voice.clone());
    if find_voice(&voice_id).is_none() {
        bail!("Unknown voice '{}'", voice_id);
    }

    let Some(synthesizer) = build_synthesizer(config, cli_api_key)? else {
        bail!(
            "No API key configured (--api-key, {} or api_key in config)",
            API_KEY_ENV
        );
    };

    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    info!(voice_id = %voice_id, entries = texts.len(), "Rendering entries");
    let results = render_all(synthesizer, texts, &voice_id).await;
    let total = results.len();
    let mut failed = 0;

    for (n, result) in results.into_iter().enumerate() {
        let path = out.join(format!("entry-{}.wav", n + 1));
        match result {
            Ok(wav) => {
                std::fs::write(&path, &wav)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{}", path.display());

                if inspect {
                    let header = WavHeader::parse(&wav)
                        .with_context(|| format!("Failed to parse {}", path.display()))?;
                    println!(
                        "  {} Hz, {} ch, {} bit, {} data bytes, {} ms",
                        header.sample_rate,
                        header.channels,
                        header.bits_per_sample,
                        header.data_size,
                        header.duration_ms()
                    );
                }
            }
            Err(e) => {
                failed += 1;
                error!(entry = n + 1, error = %e, "Entry failed");
                eprintln!("entry {}: {}", n + 1, e);
            }
        }
    }

    if failed == total {
        bail!("All {} entries failed", total);
    }
    Ok(())
}
