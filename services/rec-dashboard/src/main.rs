//!
//! src/main.rs  Andrew Belles  Oct 15th, 2026
//!
//! Entry point of the terminal dashboard. Reads commands from stdin,
//! one action at a time, and redraws the drill-down view after each
//!
//!

mod config;
mod console;
mod drill;
mod errors;
mod fetch;
mod logging;
mod normalize;
mod render;
mod types;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::Instrument;

use crate::console::{Command, Flow, Session};
use crate::errors::DashboardError;
use crate::fetch::RecommendationSource;
use crate::render::ViewOptions;

const BANNER: &str = "music recommendations, type help for commands\n";

async fn write_out(out: &mut tokio::io::Stdout, text: &str) -> Result<(), DashboardError> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

/// One action in flight at a time; the next line is only read after
/// the previous page was written
async fn run<S: RecommendationSource>(session: &mut Session<S>) -> Result<(), DashboardError> {
    let mut out = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut out, BANNER).await?;
    let status = render::render_health(&session.source().health().await);
    write_out(&mut out, &format!("{status}\n")).await?;

    loop {
        write_out(&mut out, "\n> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        if let Some(label) = session.busy_label(&line) {
            write_out(&mut out, &format!("{label}\n")).await?;
        }
        match session.handle_line(&line).await {
            Some(Flow::Continue(page)) => write_out(&mut out, &page).await?,
            Some(Flow::Quit) => return Ok(()),
            None => {}
        }
    }

    // stdin closed, end the session the same way quit does
    session.handle(Command::Quit).await;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), DashboardError> {
    let cfgs    = config::load_config()?;
    let _logger = logging::init_logging(&cfgs.logging)?;

    let client  = fetch::RecommendClient::new(&cfgs.http, &cfgs.api)?;
    let mut session = Session::new(
        client,
        ViewOptions::from(&cfgs.view),
        cfgs.api.base_url.clone()
    );

    tracing::info!(
        service="rec-dashboard",
        version=%env!("CARGO_PKG_VERSION"),
        api=%cfgs.api.base_url,
        timeout_ms=cfgs.http.timeout.as_millis() as u64,
        "starting"
    );

    let span = tracing::info_span!("session", id = %session.id);
    run(&mut session).instrument(span).await
}
