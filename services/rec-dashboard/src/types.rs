use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Optional audio features, absent means the backend never computed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub acousticness: Option<f64>,
    pub speechiness: Option<f64>
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: String,
    pub year: i32,
    pub popularity: u8,
    pub features: AudioFeatures
}


/// Similarity to the query track in percent, Unknown when the api did
/// not report any usable similarity field. Unknown is never 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Similarity {
    Percent(f64),
    Unknown
}

impl Similarity {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Similarity::Percent(p) => Some(*p),
            Similarity::Unknown => None
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Percent(p) => write!(f, "{p:.0}%"),
            Similarity::Unknown => write!(f, "n/a")
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub track: Track,
    pub similarity: Similarity,
    pub distance: Option<f64>,      // raw legacy distance, display only
    pub cluster_type: Option<String>,
    pub cluster_id: Option<i64>
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub song_found: Track,
    pub recommendations: Vec<RecommendationRecord>,
    pub fetched_at: DateTime<Utc>
}


/// Body of POST /recommend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongQuery {
    pub song_name: String,
    pub artist_name: String
}

impl SongQuery {
    pub fn new(song_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self { song_name: song_name.into(), artist_name: artist_name.into() }
    }

    /// Query that drills into a recommended track
    pub fn for_track(track: &Track) -> Self {
        Self::new(track.name.clone(), track.artists.clone())
    }
}
