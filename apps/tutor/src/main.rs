use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, settings::DEFAULT_SETTINGS_FILE, HtmlRenderer, HttpReasoningService,
    MissingReasoningService, ReasoningService, SessionController, TextRenderer,
};
use shared::domain::Difficulty;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

use commands::parse_command;
use console::{Console, Flow};

#[derive(Parser, Debug)]
#[command(about = "Rewrite propositions to disjunctive normal form, step by step")]
struct Args {
    /// JSON-RPC endpoint of the reasoning service.
    #[arg(long)]
    service_url: Option<String>,
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    difficulty: Option<u8>,
    /// Print feedback as HTML fragments instead of plain text.
    #[arg(long)]
    html: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.service_url {
        settings.service_url = Some(url);
    }
    if let Some(level) = args.difficulty {
        settings.difficulty = Difficulty(level);
    }

    let service: Arc<dyn ReasoningService> = match HttpReasoningService::from_settings(&settings)
        .context("failed to configure reasoning service")?
    {
        Some(service) => {
            info!(endpoint = %service.endpoint(), "using reasoning service");
            Arc::new(service)
        }
        None => {
            warn!("no service url configured; every exercise command will fail");
            Arc::new(MissingReasoningService)
        }
    };

    let controller = SessionController::new(service).with_difficulty(settings.difficulty);
    let controller = if args.html {
        controller.with_renderer(HtmlRenderer::default())
    } else {
        controller.with_renderer(TextRenderer::default())
    };
    let mut console = Console::new(controller);

    println!("{} (type help for commands)", settings.exercise_kind);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match console.dispatch(cmd).await {
            Flow::Continue(output) => {
                for line in output {
                    println!("{line}");
                }
            }
            Flow::Quit => break,
        }
    }

    Ok(())
}
