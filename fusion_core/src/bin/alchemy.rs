//! Terminal driver for the fusion game.
//!
//! Usage: `alchemy [config.toml]`. Type an inventory number to pick an
//! element, `l` to list, `r` to reset, `q` to quit.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fusion_core::{
    AlchemyConfig, Fallback, FusionOutcome, GameSession, GeminiOracle, Oracle, PickOutcome,
};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => AlchemyConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => AlchemyConfig::default(),
    };
    tracing::debug!(?config, "starting");

    let oracle = GeminiOracle::from_config(&config.oracle).context("building Gemini oracle")?;
    if config.oracle.fallback_on_error {
        run(GameSession::new(Fallback::new(oracle), config.fusion)).await
    } else {
        run(GameSession::new(oracle, config.fusion)).await
    }
}

async fn run<O: Oracle + 'static>(session: GameSession<O>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("⚗️  Emoji Alchemy");
    print_inventory(&session);
    println!("{}", session.phase().status_line());

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match line.trim() {
            "" => continue,
            "q" => break,
            "l" => print_inventory(&session),
            "r" => {
                session.reset();
                println!("Restarted. All discoveries were lost.");
                print_inventory(&session);
            }
            input => match input.parse::<usize>() {
                Ok(index) => pick(&session, index).await?,
                Err(_) => println!("Type a number, l, r or q."),
            },
        }
    }

    Ok(())
}

async fn pick<O: Oracle + 'static>(session: &GameSession<O>, index: usize) -> Result<()> {
    let Some(element) = session.with_inventory(|inv| inv.as_slice().get(index).cloned()) else {
        println!("No element #{index}. Discovered: {}", session.inventory_size());
        return Ok(());
    };

    match session.pick(element.id) {
        PickOutcome::Selected => println!("Selected {element}"),
        PickOutcome::Deselected => println!("Put back {element}"),
        PickOutcome::Ignored(phase) => println!("Busy ({phase})"),
        PickOutcome::UnknownElement(_) => println!("{element} is gone"),
        PickOutcome::FusionStarted(handle) => {
            println!("{}", session.phase().status_line());
            let report = handle.await.context("fusion task")?;
            match &report.outcome {
                FusionOutcome::Discovered {
                    element,
                    description,
                } => {
                    println!("✨ Created {element}! New Discovery");
                    if let Some(description) = description {
                        println!("   {}", description.trim());
                    }
                    session.acknowledge_new();
                }
                FusionOutcome::Rediscovered { element, .. } => {
                    println!("Created {element}! (already discovered)");
                }
                FusionOutcome::Failed { .. } => {
                    println!("{}", alchemy_rules::GamePhase::Error.status_line());
                }
                FusionOutcome::Stale => {}
            }
            println!("{}", session.phase().status_line());
        }
    }

    Ok(())
}

fn print_inventory<O>(session: &GameSession<O>) {
    session.with_inventory(|inv| {
        println!("Elements Library (discovered: {})", inv.size());
        for (i, element) in inv.iter().enumerate() {
            println!("  {i:>3}  {element}");
        }
    });
}
