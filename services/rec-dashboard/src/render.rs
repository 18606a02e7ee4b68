//!
//! src/render.rs  Andrew Belles  Oct 15th, 2026
//!
//! Plain text views of the drill-down state. The whole page is rebuilt
//! after every action, nested levels are indented under their parent
//!

use std::fmt::{self, Write};

use url::Url;

use crate::config::ViewConfig;
use crate::drill::{DrillLevel, DrillState, TERMINAL_LEVEL};
use crate::errors::DashboardError;
use crate::fetch::Health;
use crate::types::{RecommendationRecord, Track};

const INDENT: &str = "    ";
const NAME_WIDTH: usize = 28;
const ARTIST_WIDTH: usize = 22;
const ABSENT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_chart: bool,
    pub show_table: bool,
    pub chart_width: usize
}

impl From<&ViewConfig> for ViewOptions {
    fn from(cfg: &ViewConfig) -> Self {
        Self {
            show_chart: cfg.show_chart,
            show_table: cfg.show_table,
            chart_width: cfg.chart_width
        }
    }
}

/// Truncates on char boundaries and pads to `width`
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        format!("{s:<width$}")
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_else(|| ABSENT.to_string())
}

fn year(track: &Track) -> String {
    if track.year > 0 { track.year.to_string() } else { ABSENT.to_string() }
}

fn write_found(out: &mut String, pad: &str, level: usize, found: &Track) -> fmt::Result {
    writeln!(out, "{pad}[level {level}] found: {} / {} ({})",
        found.name, found.artists, year(found))
}

fn write_table(out: &mut String, pad: &str, level: &DrillLevel) -> fmt::Result {
    writeln!(out, "{pad}   {:>3}  {}  {}  {:>4}  {:>3}  {:>5}",
        "#", fit("song", NAME_WIDTH), fit("artist", ARTIST_WIDTH), "year", "pop", "sim")?;
    for (i, rec) in level.result.recommendations.iter().enumerate() {
        let marker = if level.selected == Some(i) { ">" } else { " " };
        writeln!(out, "{pad} {marker} {:>3}  {}  {}  {:>4}  {:>3}  {:>5}",
            i + 1,
            fit(&rec.track.name, NAME_WIDTH),
            fit(&rec.track.artists, ARTIST_WIDTH),
            year(&rec.track),
            rec.track.popularity,
            rec.similarity.to_string())?;
    }
    Ok(())
}

fn bar(rec: &RecommendationRecord, width: usize) -> String {
    match rec.similarity.percent() {
        Some(p) => {
            let filled = ((p / 100.0) * width as f64).round() as usize;
            let filled = filled.min(width);
            format!("|{}{}| {:>4}", "#".repeat(filled), " ".repeat(width - filled),
                rec.similarity.to_string())
        },
        None => format!("|{}| {:>4}", " ".repeat(width), rec.similarity.to_string())
    }
}

fn write_chart(out: &mut String, pad: &str, level: &DrillLevel, width: usize) -> fmt::Result {
    writeln!(out, "{pad}   similarity")?;
    for rec in &level.result.recommendations {
        writeln!(out, "{pad}   {} {}", fit(&rec.track.name, NAME_WIDTH), bar(rec, width))?;
    }
    Ok(())
}

fn write_details(out: &mut String, pad: &str, level: &DrillLevel) -> fmt::Result {
    writeln!(out, "{pad}   {:>3}  {}  {:>6}  {:>10}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}",
        "#", fit("song", NAME_WIDTH), "dist", "cluster", "dance", "energ", "valen",
        "acous", "speec")?;
    for (i, rec) in level.result.recommendations.iter().enumerate() {
        let f = &rec.track.features;
        let cluster = match (&rec.cluster_type, rec.cluster_id) {
            (Some(t), Some(id)) => format!("{t}:{id}"),
            (Some(t), None)     => t.clone(),
            (None, Some(id))    => id.to_string(),
            (None, None)        => ABSENT.to_string()
        };
        writeln!(out, "{pad}   {:>3}  {}  {:>6}  {:>10}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}",
            i + 1,
            fit(&rec.track.name, NAME_WIDTH),
            opt(rec.distance, 2),
            fit(&cluster, 10),
            opt(f.danceability, 2),
            opt(f.energy, 2),
            opt(f.valence, 2),
            opt(f.acousticness, 2),
            opt(f.speechiness, 2))?;
    }
    Ok(())
}

fn write_level(
    out: &mut String,
    index: usize,
    level: &DrillLevel,
    opts: &ViewOptions
) -> fmt::Result {
    let pad = INDENT.repeat(index);
    writeln!(out)?;
    write_found(out, &pad, index, &level.result.song_found)?;

    if level.result.recommendations.is_empty() {
        return writeln!(out, "{pad}   no recommendations returned");
    }
    write_table(out, &pad, level)?;
    if opts.show_chart {
        write_chart(out, &pad, level, opts.chart_width)?;
    }
    if opts.show_table {
        write_details(out, &pad, level)?;
    }
    match level.selected_record() {
        Some(rec) => writeln!(out, "{pad}   exploring: {} / {}", rec.track.name, rec.track.artists)?,
        None if index < TERMINAL_LEVEL =>
            writeln!(out, "{pad}   open {index} <row> to explore a song")?,
        None => {}
    }
    Ok(())
}

pub fn render_session(state: &DrillState, opts: &ViewOptions) -> String {
    let mut out = String::new();
    if state.depth() == 0 {
        out.push_str("no results yet, try: search Bohemian Rhapsody | Queen\n");
        return out;
    }
    for (index, level) in state.levels() {
        if write_level(&mut out, index, level, opts).is_err() {
            break;
        }
    }
    out
}

/// User facing message for a failed action, classified by cause
pub fn render_error(err: &DashboardError, api_base: &Url) -> String {
    match err {
        DashboardError::Validation(msg) => format!("invalid input: {msg}"),
        DashboardError::NotFound(detail) => format!(
            "not found: {detail}\nhint: try another name or leave the artist out"
        ),
        DashboardError::ServiceUnavailable =>
            "the recommendation service is unavailable, check that the api is running"
                .to_string(),
        DashboardError::Connection(_) => format!(
            "could not connect to the api at {api_base}\nhint: make sure it is running"
        ),
        DashboardError::Timeout => "the request took too long, try again".to_string(),
        DashboardError::UnexpectedStatus(code) => format!("unexpected error: status {code}"),
        other => format!("unexpected error: {other}")
    }
}

pub fn render_health(health: &Health) -> String {
    match health {
        Health::Connected => "api: connected".to_string(),
        Health::Degraded(code) => format!("api: responding with errors ({code})"),
        Health::Disconnected => "api: disconnected".to_string()
    }
}
