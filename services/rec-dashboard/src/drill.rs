//!
//! src/drill.rs  Andrew Belles  Oct 15th, 2026
//!
//! Drill-down view state. Holds the top level result plus up to two
//! nested results, each scoped under the row selected one level up.
//! Levels only ever populate in order: slot i+1 exists only while slot
//! i has a selected row, and changing that selection clears everything
//! deeper before the new child is stored.
//!

use tracing::{debug, info};

use crate::errors::DashboardError;
use crate::fetch::RecommendationSource;
use crate::types::{QueryResult, RecommendationRecord, SongQuery};

pub const MAX_LEVELS: usize = 3;
pub const TERMINAL_LEVEL: usize = MAX_LEVELS - 1;

#[derive(Debug, Clone, PartialEq)]
pub struct DrillLevel {
    pub result: QueryResult,
    pub selected: Option<usize>
}

impl DrillLevel {
    fn new(result: QueryResult) -> Self {
        Self { result, selected: None }
    }

    pub fn selected_record(&self) -> Option<&RecommendationRecord> {
        self.selected.and_then(|i| self.result.recommendations.get(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Level0Shown,
    Level01Shown,
    Level012Shown
}

/// What a successful event did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Level populated by the event
    Populated(usize),
    /// Selection at the last level, nothing fetched
    Terminal
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillState {
    levels: [Option<DrillLevel>; MAX_LEVELS]
}

impl DrillState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.depth() {
            0 => Phase::Empty,
            1 => Phase::Level0Shown,
            2 => Phase::Level01Shown,
            _ => Phase::Level012Shown
        }
    }

    /// Number of populated levels
    pub fn depth(&self) -> usize {
        self.levels.iter().take_while(|l| l.is_some()).count()
    }

    pub fn level(&self, level: usize) -> Option<&DrillLevel> {
        self.levels.get(level).and_then(Option::as_ref)
    }

    pub fn levels(&self) -> impl Iterator<Item = (usize, &DrillLevel)> {
        self.levels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_ref().map(|l| (i, l)))
    }

    /// Drops every slot above `level`
    fn clear_beyond(&mut self, level: usize) {
        for slot in self.levels.iter_mut().skip(level + 1) {
            *slot = None;
        }
    }

    pub fn reset(&mut self) {
        self.levels = Default::default();
    }

    /// Top level query. On success replaces level 0 and clears the rest;
    /// on failure the state is left untouched.
    pub async fn submit<S>(
        &mut self,
        source: &S,
        query: SongQuery
    ) -> Result<Outcome, DashboardError>
    where
        S: RecommendationSource + ?Sized
    {
        let query = SongQuery {
            song_name: query.song_name.trim().to_string(),
            artist_name: query.artist_name.trim().to_string()
        };
        if query.song_name.is_empty() {
            return Err(DashboardError::Validation(
                "a song name is required".to_string()
            ));
        }

        let result = source.recommend(&query).await?;

        self.levels[0] = Some(DrillLevel::new(result));
        self.clear_beyond(0);
        info!(song = %query.song_name, phase = ?self.phase(), "drill.submit");
        Ok( Outcome::Populated(0) )
    }

    /// Selects row `index` of `level` and fetches its recommendations into
    /// `level + 1`. Selecting at the last level is a no-op.
    pub async fn select_row<S>(
        &mut self,
        source: &S,
        level: usize,
        index: usize
    ) -> Result<Outcome, DashboardError>
    where
        S: RecommendationSource + ?Sized
    {
        if level == TERMINAL_LEVEL {
            debug!(level, index, "drill.select.terminal");
            return Ok( Outcome::Terminal );
        }
        if level > TERMINAL_LEVEL {
            return Err(DashboardError::Validation(
                format!("level {level} does not exist, levels are 0..={TERMINAL_LEVEL}")
            ));
        }

        let parent = self.level(level).ok_or_else(|| DashboardError::Validation(
            format!("level {level} has no results yet")
        ))?;
        let record = parent.result.recommendations.get(index)
            .ok_or_else(|| DashboardError::Validation(format!(
                "row {} is out of range, level {level} has {} rows",
                index + 1,
                parent.result.recommendations.len()
            )))?;
        let query = SongQuery::for_track(&record.track);

        let child = source.recommend(&query).await?;

        if let Some(parent) = self.levels[level].as_mut() {
            parent.selected = Some(index);
        }
        self.levels[level + 1] = Some(DrillLevel::new(child));
        self.clear_beyond(level + 1);
        info!(level, index, song = %query.song_name, phase = ?self.phase(), "drill.select");
        Ok( Outcome::Populated(level + 1) )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Health;
    use crate::normalize::parse_query_result;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    /// Answers from a script and records every query it saw
    struct Scripted {
        replies: Mutex<VecDeque<Result<QueryResult, DashboardError>>>,
        seen: Mutex<Vec<SongQuery>>
    }

    impl Scripted {
        fn new(replies: Vec<Result<QueryResult, DashboardError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new())
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last(&self) -> Option<SongQuery> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl RecommendationSource for Scripted {
        async fn recommend(&self, query: &SongQuery) -> Result<QueryResult, DashboardError> {
            self.seen.lock().unwrap().push(query.clone());
            self.replies.lock().unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DashboardError::Http("script exhausted".into())))
        }

        async fn health(&self) -> Health {
            Health::Connected
        }
    }

    fn result(found: &str, recs: &[&str]) -> QueryResult {
        let recs: Vec<_> = recs.iter()
            .map(|n| json!({"name": n, "artists": "band", "similarity_distance": 1.0}))
            .collect();
        parse_query_result(&json!({
            "song_found": {"name": found, "artist": "band", "year": 2000},
            "recommendations": recs
        })).unwrap()
    }

    async fn three_levels(source: &Scripted) -> DrillState {
        let mut state = DrillState::new();
        state.submit(source, SongQuery::new("root", "")).await.unwrap();
        state.select_row(source, 0, 0).await.unwrap();
        state.select_row(source, 1, 1).await.unwrap();
        state
    }

    #[tokio::test]
    async fn submit_populates_level_zero() {
        let source = Scripted::new(vec![Ok(result("root", &["a", "b"]))]);
        let mut state = DrillState::new();
        assert_eq!(state.phase(), Phase::Empty);

        let outcome = state.submit(&source, SongQuery::new("  root ", " band ")).await;
        assert_eq!(outcome.unwrap(), Outcome::Populated(0));
        assert_eq!(state.phase(), Phase::Level0Shown);
        assert_eq!(source.last(), Some(SongQuery::new("root", "band")));
    }

    #[tokio::test]
    async fn empty_query_never_hits_network() {
        let source = Scripted::new(vec![]);
        let mut state = DrillState::new();

        let err = state.submit(&source, SongQuery::new("   ", "Queen")).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert_eq!(source.calls(), 0);
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn walks_all_three_levels() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a", "b"])),
            Ok(result("a", &["a1", "a2"])),
            Ok(result("a2", &["x"]))
        ]);
        let state = three_levels(&source).await;

        assert_eq!(state.phase(), Phase::Level012Shown);
        assert_eq!(state.level(0).unwrap().selected, Some(0));
        assert_eq!(state.level(1).unwrap().selected, Some(1));
        assert_eq!(state.level(2).unwrap().selected, None);
        assert_eq!(state.level(2).unwrap().result.song_found.name, "a2");
        // the child query is the selected track
        assert_eq!(source.last(), Some(SongQuery::new("a2", "band")));
    }

    #[tokio::test]
    async fn reselecting_at_level_zero_clears_deeper_levels() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a", "b"])),
            Ok(result("a", &["a1", "a2"])),
            Ok(result("a2", &["x"])),
            Ok(result("b", &["b1"]))
        ]);
        let mut state = three_levels(&source).await;

        let outcome = state.select_row(&source, 0, 1).await.unwrap();
        assert_eq!(outcome, Outcome::Populated(1));
        assert_eq!(state.phase(), Phase::Level01Shown);
        assert!(state.level(2).is_none());
        assert_eq!(state.level(0).unwrap().selected, Some(1));
        let level1 = state.level(1).unwrap();
        assert_eq!(level1.result.song_found.name, "b");
        assert_eq!(level1.selected, None);
    }

    #[tokio::test]
    async fn selecting_at_level_one_only_fetches_level_two() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a"])),
            Ok(result("a", &["a1"])),
            Ok(result("a1", &["z"]))
        ]);
        let mut state = DrillState::new();
        state.submit(&source, SongQuery::new("root", "")).await.unwrap();
        state.select_row(&source, 0, 0).await.unwrap();
        let level0 = state.level(0).cloned();

        state.select_row(&source, 1, 0).await.unwrap();
        assert_eq!(source.calls(), 3);
        assert_eq!(state.level(0).cloned(), level0);
        assert_eq!(source.last(), Some(SongQuery::new("a1", "band")));
    }

    #[tokio::test]
    async fn level_two_is_terminal() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a", "b"])),
            Ok(result("a", &["a1", "a2"])),
            Ok(result("a2", &["x"]))
        ]);
        let mut state = three_levels(&source).await;
        let before = state.clone();

        let outcome = state.select_row(&source, 2, 0).await.unwrap();
        assert_eq!(outcome, Outcome::Terminal);
        assert_eq!(source.calls(), 3);
        assert_eq!(state, before);
        assert_eq!(state.phase(), Phase::Level012Shown);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_untouched() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a", "b"])),
            Ok(result("a", &["a1"])),
            Err(DashboardError::Timeout),
            Err(DashboardError::NotFound("No track found".into()))
        ]);
        let mut state = DrillState::new();
        state.submit(&source, SongQuery::new("root", "")).await.unwrap();
        state.select_row(&source, 0, 0).await.unwrap();
        let before = state.clone();

        let err = state.select_row(&source, 0, 1).await.unwrap_err();
        assert!(matches!(err, DashboardError::Timeout));
        assert_eq!(state, before);
        // no automatic retry
        assert_eq!(source.calls(), 3);

        let err = state.submit(&source, SongQuery::new("other", "")).await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(ref d) if d == "No track found"));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn resubmit_clears_nested_levels() {
        let source = Scripted::new(vec![
            Ok(result("root", &["a", "b"])),
            Ok(result("a", &["a1", "a2"])),
            Ok(result("a2", &["x"])),
            Ok(result("fresh", &["f"]))
        ]);
        let mut state = three_levels(&source).await;

        state.submit(&source, SongQuery::new("fresh", "")).await.unwrap();
        assert_eq!(state.phase(), Phase::Level0Shown);
        assert_eq!(state.level(0).unwrap().selected, None);
        assert_eq!(state.level(0).unwrap().result.song_found.name, "fresh");
    }

    #[tokio::test]
    async fn invalid_selections_are_rejected_locally() {
        let source = Scripted::new(vec![Ok(result("root", &["a"]))]);
        let mut state = DrillState::new();

        let err = state.select_row(&source, 0, 0).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));

        state.submit(&source, SongQuery::new("root", "")).await.unwrap();
        let err = state.select_row(&source, 0, 5).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        let err = state.select_row(&source, 1, 0).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        let err = state.select_row(&source, 7, 0).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));

        assert_eq!(source.calls(), 1);
        assert_eq!(state.phase(), Phase::Level0Shown);
    }

    #[tokio::test]
    async fn reset_drops_everything() {
        let source = Scripted::new(vec![Ok(result("root", &["a"]))]);
        let mut state = DrillState::new();
        state.submit(&source, SongQuery::new("root", "")).await.unwrap();

        state.reset();
        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(state.levels().count(), 0);
    }
}
