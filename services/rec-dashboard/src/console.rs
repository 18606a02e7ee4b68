//!
//! src/console.rs  Andrew Belles  Oct 15th, 2026
//!
//! Line commands of the dashboard and the per-session handler that maps
//! them onto drill-down events. Every action re-renders the whole view.
//!

use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::drill::{DrillState, Outcome};
use crate::errors::DashboardError;
use crate::fetch::RecommendationSource;
use crate::render::{ViewOptions, render_error, render_health, render_session};
use crate::types::SongQuery;

pub const HELP: &str = "\
commands:
  search <song> [| <artist>]   find a song and its recommendations
  open <level> <row>           explore recommendation <row> of <level> (0-2)
  chart                        toggle the similarity chart
  table                        toggle the full detail table
  status                       check the recommendation api
  clear                        forget every result
  help                         show this message
  quit                         leave the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SongQuery),
    Open { level: usize, index: usize },
    ToggleChart,
    ToggleTable,
    Status,
    Clear,
    Help,
    Quit
}

fn parse_number(s: Option<&str>, what: &str) -> Result<usize, DashboardError> {
    s.ok_or_else(|| DashboardError::Validation(format!("missing {what}")))?
        .parse::<usize>()
        .map_err(|_| DashboardError::Validation(format!("{what} must be a number")))
}

/// Blank lines parse to None
pub fn parse_command(line: &str) -> Result<Option<Command>, DashboardError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let cmd = match head.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            let (song, artist) = rest.split_once('|').unwrap_or((rest, ""));
            Command::Search(SongQuery::new(song.trim(), artist.trim()))
        },
        "open" | "o" => {
            let mut args = rest.split_whitespace();
            let level = parse_number(args.next(), "level")?;
            let row   = parse_number(args.next(), "row")?;
            if row == 0 {
                return Err(DashboardError::Validation("rows start at 1".to_string()));
            }
            Command::Open { level, index: row - 1 }
        },
        "chart"  => Command::ToggleChart,
        "table"  => Command::ToggleTable,
        "status" => Command::Status,
        "clear"  => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(DashboardError::Validation(
            format!("unknown command '{other}', type help")
        ))
    };
    Ok(Some(cmd))
}

pub enum Flow {
    Continue(String),
    Quit
}

/// Everything that lives for one user session
pub struct Session<S> {
    pub id: Uuid,
    pub state: DrillState,
    pub view: ViewOptions,
    source: S,
    api_base: Url
}

impl<S: RecommendationSource> Session<S> {
    pub fn new(source: S, view: ViewOptions, api_base: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: DrillState::new(),
            view,
            source,
            api_base
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn page(&self, message: Option<String>) -> String {
        let mut out = String::new();
        if let Some(message) = message {
            out.push_str(&message);
            out.push('\n');
        }
        out.push_str(&render_session(&self.state, &self.view));
        out
    }

    fn report(&self, result: Result<Outcome, DashboardError>) -> Option<String> {
        match result {
            Ok(Outcome::Populated(_)) => None,
            Ok(Outcome::Terminal) => Some(
                "this is the deepest level, pick a row higher up to explore".to_string()
            ),
            Err(e) => Some(render_error(&e, &self.api_base))
        }
    }

    pub async fn handle(&mut self, cmd: Command) -> Flow {
        let message = match cmd {
            Command::Search(query) => {
                let result = self.state.submit(&self.source, query).await;
                self.report(result)
            },
            Command::Open { level, index } => {
                let result = self.state.select_row(&self.source, level, index).await;
                self.report(result)
            },
            Command::ToggleChart => {
                self.view.show_chart = !self.view.show_chart;
                None
            },
            Command::ToggleTable => {
                self.view.show_table = !self.view.show_table;
                None
            },
            Command::Status => Some(render_health(&self.source.health().await)),
            Command::Clear => {
                self.state.reset();
                None
            },
            Command::Help => Some(HELP.to_string()),
            Command::Quit => {
                self.state.reset();
                info!(session = %self.id, "session.end");
                return Flow::Quit;
            }
        };
        Flow::Continue(self.page(message))
    }

    /// Parses and handles one input line, parse errors are shown like
    /// any other failed action
    pub async fn handle_line(&mut self, line: &str) -> Option<Flow> {
        match parse_command(line) {
            Ok(Some(cmd)) => Some(self.handle(cmd).await),
            Ok(None) => None,
            Err(e) => Some(Flow::Continue(self.page(Some(render_error(&e, &self.api_base)))))
        }
    }

    pub fn busy_label(&self, line: &str) -> Option<String> {
        match parse_command(line) {
            Ok(Some(Command::Search(q))) if !q.song_name.is_empty() =>
                Some(format!("searching recommendations for '{}'...", q.song_name)),
            Ok(Some(Command::Open { level, index })) => self.state.level(level)
                .and_then(|l| l.result.recommendations.get(index))
                .filter(|_| level < crate::drill::TERMINAL_LEVEL)
                .map(|r| format!("exploring '{}'...", r.track.name)),
            Ok(Some(Command::Status)) => Some("checking api...".to_string()),
            _ => None
        }
    }
}
