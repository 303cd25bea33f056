use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidscribe::cli::{Cli, Commands};
use vidscribe::{identifier, output, utils, Config, ErrorKind, Result, TranscriptPipeline};

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "vidscribe=debug" } else { "vidscribe=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only the transcript
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::PrimaryUnavailable => ExitCode::from(2),
        ErrorKind::DownloadFailed => ExitCode::from(3),
        ErrorKind::TranscriptionFailed => ExitCode::from(4),
        ErrorKind::Workspace => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Id { reference } => {
            println!("{}", identifier::extract(&reference));
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Run with --show to print the current settings.");
            }
        }
        Commands::Transcribe {
            reference,
            output,
            format,
            save_audio,
            model,
            language,
            no_fallback,
        } => {
            let mut config = Config::load().await?;
            if let Some(model) = model {
                config.fallback.model = model;
            }
            if language.is_some() {
                config.fallback.language = language;
            }
            if no_fallback {
                config.fallback.enabled = false;
            }

            let format = match format {
                Some(format) => format,
                None => config.app.default_output_format.parse()?,
            };

            if config.fallback.enabled {
                let missing = utils::check_dependencies(&config.fallback.downloader).await;
                if !missing.is_empty() {
                    eprintln!("⚠️  Dependency check warnings:");
                    for dep in missing {
                        eprintln!("   • {}", dep);
                    }
                    eprintln!("   (The local fallback may fail without them)");
                }
            }

            let pipeline = TranscriptPipeline::new(config).quiet(cli.quiet);
            let workspace = pipeline.acquire_workspace()?;

            tracing::info!("Starting transcript for: {}", reference);
            let result = pipeline.transcribe_in(&workspace, &reference).await;

            if save_audio && workspace.artifact_exists() {
                let name = utils::sanitize_filename(identifier::extract(&reference));
                let saved = workspace.preserve(&std::env::current_dir()?, &name)?;
                eprintln!("Audio saved to: {}", saved.display());
            }

            let transcript = match result {
                Ok(transcript) => transcript,
                Err(err) => {
                    eprintln!("{} {}", style("Error:").red().bold(), err);
                    let mut source = std::error::Error::source(&err);
                    while let Some(cause) = source {
                        eprintln!("  caused by: {}", cause);
                        source = cause.source();
                    }
                    return Ok(exit_code(err.kind()));
                }
            };

            tracing::info!(
                "Transcript ready in {}",
                utils::format_duration(transcript.metadata.elapsed_secs)
            );

            match output {
                Some(path) => {
                    output::save_to_file(&transcript, &path, &format).await?;
                    eprintln!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&transcript, &format)?;
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
