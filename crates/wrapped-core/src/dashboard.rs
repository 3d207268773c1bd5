//! Everything the presenter shows, recomputed from the curated row tables.
//!
//! Aggregate files on disk are only compared against the recomputation;
//! disagreements are reported as stale instead of being trusted.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::curated::{
    CuratedStore, ARTIST_FREQUENCY, DURATION_STATS, GENRE_SUMMARY, LISTENING_BY_HOUR,
    LISTENING_DAILY, SUMMARY,
};
use crate::model::{CuratedTables, TimeRange};
use crate::provider::DatasetProvider;
use crate::stats::{
    duration_buckets, duration_minutes, hourly_histogram, round2, top_n, Aggregates, Count,
    DurationStats, Summary, TOP_AGGREGATE,
};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("curated files missing ({}) and regeneration failed: {source:#}", .missing.join(", "))]
    Regenerate {
        missing: Vec<&'static str>,
        source: anyhow::Error,
    },
    #[error("curated files missing: {}", .0.join(", "))]
    MissingFiles(Vec<&'static str>),
    #[error("loading curated files: {0:#}")]
    Load(#[from] anyhow::Error),
}

/// A top track with its artists joined back in, primary first.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackView {
    pub time_range: TimeRange,
    pub rank: u32,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_min: Option<f64>,
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistView {
    pub time_range: TimeRange,
    pub rank: u32,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    pub followers: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlights {
    pub total_minutes: f64,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub most_active_hour: Option<u32>,
    pub play_count: usize,
    pub top_tracks: Vec<String>,
    pub top_artists: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub tracks: Vec<TrackView>,
    pub artists: Vec<ArtistView>,
    pub genres: Vec<Count>,
    pub artist_frequency: Vec<Count>,
    pub hourly: [u64; 24],
    pub daily: Vec<(NaiveDate, u64)>,
    pub durations: Option<DurationStats>,
    pub duration_buckets: Vec<Count>,
    pub highlights: Highlights,
    /// Aggregate files whose contents disagree with the recomputation.
    pub stale: Vec<&'static str>,
    /// Curated files were regenerated through the provider during this load.
    pub regenerated: bool,
}

impl Dashboard {
    /// Load the curated directory, asking `provider` to rebuild it first if
    /// any expected file is missing.
    pub fn load(
        store: &CuratedStore,
        provider: Option<&dyn DatasetProvider>,
    ) -> Result<Self, DashboardError> {
        let mut regenerated = false;
        let missing = store.missing_files();
        if !missing.is_empty() {
            let Some(provider) = provider else {
                return Err(DashboardError::MissingFiles(missing));
            };
            info!("Curated files missing ({}), regenerating", missing.join(", "));
            provider
                .materialize()
                .map_err(|source| DashboardError::Regenerate {
                    missing: missing.clone(),
                    source,
                })?;
            regenerated = true;

            let still_missing = store.missing_files();
            if !still_missing.is_empty() {
                return Err(DashboardError::MissingFiles(still_missing));
            }
        }

        let tables = store.load_tables()?;
        let aggregates = Aggregates::compute(&tables);
        let summary = Summary::compute(&tables, &aggregates);

        let mut dashboard = Self::build(&tables, &aggregates, &summary);
        dashboard.stale = find_stale(store, &aggregates, &summary);
        dashboard.regenerated = regenerated;
        for name in &dashboard.stale {
            warn!("{} disagrees with the row tables; showing recomputed values", name);
        }
        Ok(dashboard)
    }

    pub fn from_tables(tables: &CuratedTables) -> Self {
        let aggregates = Aggregates::compute(tables);
        let summary = Summary::compute(tables, &aggregates);
        Self::build(tables, &aggregates, &summary)
    }

    fn build(tables: &CuratedTables, aggregates: &Aggregates, summary: &Summary) -> Self {
        let tracks = tables
            .tracks
            .iter()
            .map(|t| TrackView {
                time_range: t.time_range,
                rank: t.rank,
                name: t.name.clone(),
                artists: tables
                    .artists_of(t.time_range, t.rank)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                album: t.album.clone(),
                duration_min: t.duration_min,
                popularity: t.popularity,
            })
            .collect();

        let artists = tables
            .artists
            .iter()
            .map(|a| ArtistView {
                time_range: a.time_range,
                rank: a.rank,
                name: a.name.clone(),
                genres: tables
                    .genres_of(a.time_range, a.rank)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                popularity: a.popularity,
                followers: a.followers,
            })
            .collect();

        let unique_tracks: HashSet<&str> = tables
            .tracks
            .iter()
            .map(|t| t.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        let unique_artists: HashSet<&str> = tables
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();

        Self {
            tracks,
            artists,
            genres: top_n(&aggregates.genres, TOP_AGGREGATE),
            artist_frequency: top_n(&aggregates.artist_frequency, TOP_AGGREGATE),
            hourly: hourly_histogram(&aggregates.hourly),
            daily: aggregates.daily.iter().map(|(d, c)| (*d, *c)).collect(),
            durations: aggregates.durations.clone(),
            duration_buckets: duration_buckets(&duration_minutes(tables)),
            highlights: Highlights {
                total_minutes: summary.total_minutes_top_tracks,
                unique_tracks: unique_tracks.len(),
                unique_artists: unique_artists.len(),
                most_active_hour: summary.most_active_hour,
                play_count: tables.plays.len(),
                top_tracks: summary.top_5_tracks.clone(),
                top_artists: summary.top_5_artists.clone(),
            },
            stale: Vec::new(),
            regenerated: false,
        }
    }

    /// Track rows of one window, or all windows when `range` is `None`.
    pub fn tracks_in(&self, range: Option<TimeRange>) -> Vec<&TrackView> {
        self.tracks
            .iter()
            .filter(|t| range.map_or(true, |r| t.time_range == r))
            .collect()
    }

    pub fn artists_in(&self, range: Option<TimeRange>) -> Vec<&ArtistView> {
        self.artists
            .iter()
            .filter(|a| range.map_or(true, |r| a.time_range == r))
            .collect()
    }
}

fn find_stale(store: &CuratedStore, aggregates: &Aggregates, summary: &Summary) -> Vec<&'static str> {
    let mut stale = Vec::new();

    let expected_counts = [
        (GENRE_SUMMARY, top_n(&aggregates.genres, TOP_AGGREGATE)),
        (ARTIST_FREQUENCY, top_n(&aggregates.artist_frequency, TOP_AGGREGATE)),
        (LISTENING_BY_HOUR, aggregates.hourly_as_counts()),
        (LISTENING_DAILY, aggregates.daily_as_counts()),
    ];
    for (name, expected) in expected_counts {
        match store.load_counts(name) {
            Ok(on_disk) if on_disk == expected => {}
            Ok(_) => stale.push(name),
            Err(e) => {
                warn!("{:#}", e);
                stale.push(name);
            }
        }
    }

    let expected_metrics: Vec<(&str, f64)> = aggregates
        .durations
        .as_ref()
        .map(|d| d.metrics())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(m, v)| v.map(|v| (m, v)))
        .collect();
    match store.load_metrics() {
        Ok(on_disk) => {
            let same = on_disk.len() == expected_metrics.len()
                && on_disk
                    .iter()
                    .zip(&expected_metrics)
                    .all(|((m1, v1), (m2, v2))| m1 == m2 && close(*v1, *v2));
            if !same {
                stale.push(DURATION_STATS);
            }
        }
        Err(e) => {
            warn!("{:#}", e);
            stale.push(DURATION_STATS);
        }
    }

    match store.load_summary() {
        Ok(on_disk) => {
            let same = on_disk.top_5_tracks == summary.top_5_tracks
                && on_disk.top_5_artists == summary.top_5_artists
                && on_disk.most_active_hour == summary.most_active_hour
                && round2(on_disk.total_minutes_top_tracks) == summary.total_minutes_top_tracks;
            if !same {
                stale.push(SUMMARY);
            }
        }
        Err(e) => {
            warn!("{:#}", e);
            stale.push(SUMMARY);
        }
    }

    stale
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        parse_timestamp, ArtistGenreRow, ArtistRow, PlayEventRow, TrackArtistRow, TrackRow,
    };
    use crate::normalize::NormalizeReport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tables() -> CuratedTables {
        let track = |rank: u32, name: &str, min: f64| TrackRow {
            time_range: TimeRange::ShortTerm,
            rank,
            track_id: None,
            name: name.into(),
            album: None,
            duration_ms: Some((min * 60000.0) as u64),
            duration_min: Some(min),
            popularity: None,
            explicit: None,
        };
        let lead = |rank: u32, name: &str| TrackArtistRow {
            time_range: TimeRange::ShortTerm,
            rank,
            position: 0,
            artist_id: None,
            name: name.into(),
        };
        let play = |ts: &str| PlayEventRow {
            played_at: parse_timestamp(ts),
            track_id: None,
            track_name: "x".into(),
            primary_artist: None,
            duration_ms: None,
        };
        CuratedTables {
            tracks: vec![track(1, "One", 3.0), track(2, "Two", 5.0)],
            track_artists: vec![lead(1, "A"), lead(2, "A")],
            artists: vec![ArtistRow {
                time_range: TimeRange::LongTerm,
                rank: 1,
                artist_id: None,
                name: "A".into(),
                popularity: Some(60),
                followers: None,
            }],
            artist_genres: vec![ArtistGenreRow {
                time_range: TimeRange::LongTerm,
                rank: 1,
                genre: "shoegaze".into(),
            }],
            plays: vec![play("2024-02-01T21:00:00Z"), play("2024-02-01T21:10:00Z")],
        }
    }

    #[test]
    fn test_from_tables() {
        let d = Dashboard::from_tables(&tables());
        assert_eq!(d.highlights.total_minutes, 8.0);
        assert_eq!(d.highlights.unique_tracks, 2);
        assert_eq!(d.highlights.unique_artists, 1);
        assert_eq!(d.highlights.most_active_hour, Some(21));
        assert_eq!(d.highlights.play_count, 2);
        assert_eq!(d.highlights.top_tracks, vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(d.highlights.top_artists, vec!["A".to_string()]);
        assert_eq!(d.hourly[21], 2);
        assert_eq!(d.artist_frequency, vec![Count::new("A", 2)]);
        assert_eq!(d.tracks[0].artists, vec!["A".to_string()]);
        assert_eq!(d.artists[0].genres, vec!["shoegaze".to_string()]);
        assert_eq!(d.tracks_in(Some(TimeRange::LongTerm)).len(), 0);
        assert_eq!(d.artists_in(None).len(), 1);
    }

    #[test]
    fn test_missing_without_provider() {
        let dir = tempfile::tempdir().unwrap();
        let store = CuratedStore::new(dir.path());
        assert!(matches!(
            Dashboard::load(&store, None),
            Err(DashboardError::MissingFiles(_))
        ));
    }

    struct WritingProvider {
        store: CuratedStore,
        calls: AtomicUsize,
    }

    impl DatasetProvider for WritingProvider {
        fn materialize(&self) -> anyhow::Result<NormalizeReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let t = tables();
            let aggregates = Aggregates::compute(&t);
            let summary = Summary::compute(&t, &aggregates);
            self.store.write_all(&t, &aggregates, &summary)?;
            Ok(NormalizeReport::default())
        }
    }

    struct FailingProvider;

    impl DatasetProvider for FailingProvider {
        fn materialize(&self) -> anyhow::Result<NormalizeReport> {
            anyhow::bail!("no raw files")
        }
    }

    #[test]
    fn test_regenerates_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CuratedStore::new(dir.path());
        let provider = WritingProvider {
            store: store.clone(),
            calls: AtomicUsize::new(0),
        };

        let d = Dashboard::load(&store, Some(&provider as &dyn DatasetProvider)).unwrap();
        assert!(d.regenerated);
        assert!(d.stale.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // complete directory: provider not consulted again
        let d = Dashboard::load(&store, Some(&provider as &dyn DatasetProvider)).unwrap();
        assert!(!d.regenerated);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_regenerate_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = CuratedStore::new(dir.path());
        let err = Dashboard::load(&store, Some(&FailingProvider as &dyn DatasetProvider)).unwrap_err();
        assert!(matches!(err, DashboardError::Regenerate { .. }));
        assert!(err.to_string().contains("no raw files"));
    }

    #[test]
    fn test_tampered_aggregate_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let store = CuratedStore::new(dir.path());
        let provider = WritingProvider {
            store: store.clone(),
            calls: AtomicUsize::new(0),
        };
        Dashboard::load(&store, Some(&provider as &dyn DatasetProvider)).unwrap();

        std::fs::write(store.path(GENRE_SUMMARY), "genre,count\nshoegaze,99\n").unwrap();
        let d = Dashboard::load(&store, Some(&provider as &dyn DatasetProvider)).unwrap();
        assert_eq!(d.stale, vec![GENRE_SUMMARY]);
        // recomputed value wins
        assert_eq!(d.genres, vec![Count::new("shoegaze", 1)]);
    }
}
