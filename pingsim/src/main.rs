//! `pingsim`: terminal front end of a simulated ping session.
//!
//! Starts a session on the requested target, prints every event as it
//! arrives, and on Ctrl-C (or once `--duration` elapsed) stops the session
//! and optionally exports the log.

mod cli;

use anyhow::{Context as _, Result, bail};
use chrono::Utc;
use clap::Parser;
use cli::Cli;
use log::{debug, info};
use pingsim::{EventReceiver, LogBook, LogEvent, ProbeSession, display_line};
use std::future;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli);

    let target = cli.target.trim();
    if target.is_empty() {
        bail!("Please enter an IP address or hostname");
    }

    let config = cli.session_config();
    // longest a probe can stay in flight after the session stopped
    let settle = config.model.max_latency().into_duration();

    let mut session = ProbeSession::with_config(config);
    let mut events = session.subscribe();
    let mut book = LogBook::new();

    if !session.start(target) {
        render_pending(&mut book, &mut events);
        bail!("Failed to start ping. Please check the IP address.");
    }
    info!("probing {target} every {}", cli.interval);

    let run_for = async {
        match cli.duration {
            Some(duration) => sleep(duration.into_duration()).await,
            None => future::pending::<()>().await,
        }
    };
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(run_for, interrupted);

    loop {
        tokio::select! {
            Some(event) = events.recv() => render(&mut book, event),
            () = &mut run_for => {
                debug!("run duration elapsed");
                break;
            }
            result = &mut interrupted => {
                result.context("Failed to listen for Ctrl-C")?;
                debug!("interrupted");
                break;
            }
        }
    }

    let stats = session.stop();
    sleep(settle).await;
    render_pending(&mut book, &mut events);

    if let Some(stats) = stats {
        info!(
            "{} probes sent to {}, {} events logged",
            stats.packets_transmitted,
            stats.target,
            book.len()
        );
    }

    if let Some(path) = cli.export_path(Utc::now()) {
        if book.export_to_path(&path)? {
            println!("Log exported to {}", path.display());
        } else {
            println!("Nothing to export");
        }
    }

    Ok(())
}

fn render(book: &mut LogBook, event: LogEvent) {
    println!("{}", display_line(&event));
    book.push(event);
}

fn render_pending(book: &mut LogBook, events: &mut EventReceiver) {
    while let Ok(event) = events.try_recv() {
        render(book, event);
    }
}

/// Setup diagnostic logging. Library diagnostics go through the `log`
/// facade and are picked up by the subscriber.
fn setup_logging(cli: &Cli) {
    let filter = EnvFilter::try_new(cli.log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
