//!
//! src/normalize.rs  Andrew Belles  Oct 15th, 2026
//!
//! Turns loosely typed recommendation records into canonical ones.
//! Every api version reported similarity differently, so the percentage
//! is derived through a fixed precedence of extractors. Nothing here
//! fails: a malformed field is treated as absent.
//!

use chrono::Utc;
use serde_json::Value;

use crate::errors::DashboardError;
use crate::types::{AudioFeatures, QueryResult, RecommendationRecord, Similarity, Track};

pub const UNKNOWN: &str = "Unknown";

const PERCENTAGE_KEYS: [&str; 2] = ["similarity_percentage", "similarity_percent"];
const SCORE_KEYS: [&str; 2]      = ["similarity_score", "score"];
const DISTANCE_KEYS: [&str; 2]   = ["similarity_distance", "distance"];

/// Extracts an unclamped percentage from a raw record, None if the
/// source field is absent or unusable
type SimilarityExtractor = fn(&Value) -> Option<f64>;

/// Evaluated in order, first usable field wins
const SIMILARITY_EXTRACTORS: [SimilarityExtractor; 3] = [
    from_percentage,
    from_score,
    from_distance
];

fn from_percentage(raw: &Value) -> Option<f64> {
    first_number(raw, &PERCENTAGE_KEYS)
}

fn from_score(raw: &Value) -> Option<f64> {
    first_number(raw, &SCORE_KEYS).map(|s| s * 100.0)
}

fn from_distance(raw: &Value) -> Option<f64> {
    first_number(raw, &DISTANCE_KEYS).map(|d| 100.0 - d * 10.0)
}

/// Numbers and numeric strings, anything else (null, bool, NaN) is absent
pub fn coerce_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None
    };
    n.filter(|x| x.is_finite())
}

fn first_number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| raw.get(*k).and_then(coerce_f64))
}

fn number(raw: &Value, key: &str) -> Option<f64> {
    raw.get(key).and_then(coerce_f64)
}

pub fn similarity_of(raw: &Value) -> Similarity {
    SIMILARITY_EXTRACTORS
        .iter()
        .find_map(|extract| extract(raw))
        .map(|p| Similarity::Percent(p.clamp(0.0, 100.0)))
        .unwrap_or(Similarity::Unknown)
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let names: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if names.is_empty() { None } else { Some(names.join(", ")) }
        },
        Value::Number(n) => Some(n.to_string()),
        _ => None
    }
}

fn artists_of(raw: &Value) -> String {
    ["artists", "artist"]
        .iter()
        .find_map(|k| raw.get(*k).and_then(text))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn features_of(raw: &Value) -> AudioFeatures {
    AudioFeatures {
        danceability: number(raw, "danceability"),
        energy:       number(raw, "energy"),
        valence:      number(raw, "valence"),
        acousticness: number(raw, "acousticness"),
        speechiness:  number(raw, "speechiness")
    }
}

/// Shared by song_found and every recommendation
pub fn normalize_track(raw: &Value) -> Track {
    let name = raw.get("name")
        .and_then(text)
        .unwrap_or_else(|| UNKNOWN.to_string());

    // float -> int casts saturate
    let year = number(raw, "year").map(|y| y.trunc() as i32).unwrap_or(0);
    let popularity = number(raw, "popularity")
        .map(|p| p.trunc().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);

    Track {
        name,
        artists: artists_of(raw),
        year,
        popularity,
        features: features_of(raw)
    }
}

pub fn normalize(raw: &Value) -> RecommendationRecord {
    RecommendationRecord {
        track: normalize_track(raw),
        similarity: similarity_of(raw),
        distance: first_number(raw, &DISTANCE_KEYS),
        cluster_type: raw.get("cluster_type").and_then(text),
        cluster_id: number(raw, "cluster_id").map(|c| c.trunc() as i64)
    }
}

/// Validates the envelope of a 200 body. Individual records never fail,
/// only a missing song_found or recommendations list does.
pub fn parse_query_result(body: &Value) -> Result<QueryResult, DashboardError> {
    let song_found = body.get("song_found")
        .filter(|v| v.is_object())
        .ok_or_else(|| DashboardError::Parse("response missing song_found".into()))?;

    let recommendations = body.get("recommendations")
        .and_then(Value::as_array)
        .ok_or_else(|| DashboardError::Parse(
            "response missing recommendations".into()
        ))?;

    Ok( QueryResult {
        song_found: normalize_track(song_found),
        recommendations: recommendations.iter().map(normalize).collect(),
        fetched_at: Utc::now()
    })
}
