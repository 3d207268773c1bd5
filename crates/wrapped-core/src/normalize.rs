//! Raw JSON → curated row tables, aggregates and summary.
//!
//! Every field is pulled out of the JSON independently. A missing or
//! mistyped field leaves that cell empty and the rest of the row intact;
//! an item that is not even an object still yields a row, so row counts
//! always match item counts.

use std::cmp::Ordering;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::curated::CuratedStore;
use crate::model::{
    parse_timestamp, ArtistGenreRow, ArtistRow, CuratedTables, PlayEventRow, TimeRange,
    TrackArtistRow, TrackRow,
};
use crate::provider::DatasetProvider;
use crate::raw::{Endpoint, RawStore};
use crate::stats::{Aggregates, Summary};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no raw files found in {0}; run `wrapped fetch` first")]
    NoRawData(PathBuf),
    #[error("writing curated files: {0:#}")]
    Write(anyhow::Error),
}

#[derive(Debug, Default, Clone)]
pub struct NormalizeReport {
    pub tracks: usize,
    pub artists: usize,
    pub plays: usize,
    /// Raw files that were expected but absent or unparseable.
    pub missing: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    raw: RawStore,
    curated: CuratedStore,
    time_ranges: Vec<TimeRange>,
}

impl Normalizer {
    pub fn new(raw: RawStore, curated: CuratedStore, time_ranges: Vec<TimeRange>) -> Self {
        Self {
            raw,
            curated,
            time_ranges,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RawStore::new(&config.paths.raw_dir),
            CuratedStore::new(&config.paths.curated_dir),
            config.fetch.time_ranges.clone(),
        )
    }

    pub fn curated(&self) -> &CuratedStore {
        &self.curated
    }

    /// Build the row tables from whatever raw files exist.
    pub fn build(&self) -> Result<(CuratedTables, Vec<PathBuf>), NormalizeError> {
        let mut tables = CuratedTables::default();
        let mut missing = Vec::new();
        let mut found = 0usize;

        for &range in &self.time_ranges {
            if let Some(doc) = self.read(Endpoint::TopTracks, Some(range), &mut missing) {
                found += 1;
                flatten_tracks(range, items_of(&doc), &mut tables);
            }
        }

        for &range in &self.time_ranges {
            if let Some(doc) = self.read(Endpoint::TopArtists, Some(range), &mut missing) {
                found += 1;
                flatten_artists(range, items_of(&doc), &mut tables);
            }
        }

        if let Some(doc) = self.read(Endpoint::RecentlyPlayed, None, &mut missing) {
            found += 1;
            tables.plays = flatten_plays(items_of(&doc));
        }

        if found == 0 {
            return Err(NormalizeError::NoRawData(self.raw.dir().to_path_buf()));
        }
        Ok((tables, missing))
    }

    fn read(
        &self,
        endpoint: Endpoint,
        range: Option<TimeRange>,
        missing: &mut Vec<PathBuf>,
    ) -> Option<Value> {
        let path = self.raw.path_for(endpoint, range);
        match self.raw.read(endpoint, range) {
            Ok(Some(doc)) => Some(doc),
            Ok(None) => {
                warn!("Raw file missing, skipping: {}", path.display());
                missing.push(path);
                None
            }
            Err(e) => {
                warn!("Raw file unreadable, skipping: {:#}", e);
                missing.push(path);
                None
            }
        }
    }

    /// Build tables, compute aggregates and the summary, write everything.
    pub fn run(&self) -> Result<NormalizeReport, NormalizeError> {
        let (tables, missing) = self.build()?;
        let aggregates = Aggregates::compute(&tables);
        let summary = Summary::compute(&tables, &aggregates);
        let written = self
            .curated
            .write_all(&tables, &aggregates, &summary)
            .map_err(NormalizeError::Write)?;

        info!(
            "Normalized {} track rows, {} artist rows, {} plays",
            tables.tracks.len(),
            tables.artists.len(),
            tables.plays.len()
        );
        Ok(NormalizeReport {
            tracks: tables.tracks.len(),
            artists: tables.artists.len(),
            plays: tables.plays.len(),
            missing,
            written,
        })
    }
}

impl DatasetProvider for Normalizer {
    fn materialize(&self) -> anyhow::Result<NormalizeReport> {
        Ok(self.run()?)
    }
}

fn items_of(doc: &Value) -> &[Value] {
    match doc["items"].as_array() {
        Some(items) => items,
        None => {
            warn!("Raw document has no items array");
            &[]
        }
    }
}

fn str_field(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}

/// Non-negative integer, accepting integral floats (`180000.0`).
fn u64_field(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

fn u32_field(v: &Value) -> Option<u32> {
    u64_field(v).and_then(|n| u32::try_from(n).ok())
}

pub fn flatten_tracks(range: TimeRange, items: &[Value], tables: &mut CuratedTables) {
    for (i, item) in items.iter().enumerate() {
        let rank = (i + 1) as u32;
        let duration_ms = u64_field(&item["duration_ms"]);
        tables.tracks.push(TrackRow {
            time_range: range,
            rank,
            track_id: str_field(&item["id"]),
            name: str_field(&item["name"]).unwrap_or_default(),
            album: str_field(&item["album"]["name"]),
            duration_ms,
            duration_min: duration_ms.map(|ms| ms as f64 / 60000.0),
            popularity: u32_field(&item["popularity"]),
            explicit: item["explicit"].as_bool(),
        });

        let artists = item["artists"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        for (position, artist) in artists.iter().enumerate() {
            tables.track_artists.push(TrackArtistRow {
                time_range: range,
                rank,
                position: position as u32,
                artist_id: str_field(&artist["id"]),
                name: str_field(&artist["name"]).unwrap_or_default(),
            });
        }
    }
}

pub fn flatten_artists(range: TimeRange, items: &[Value], tables: &mut CuratedTables) {
    for (i, item) in items.iter().enumerate() {
        let rank = (i + 1) as u32;
        tables.artists.push(ArtistRow {
            time_range: range,
            rank,
            artist_id: str_field(&item["id"]),
            name: str_field(&item["name"]).unwrap_or_default(),
            popularity: u32_field(&item["popularity"]),
            followers: u64_field(&item["followers"]["total"]),
        });

        let genres = item["genres"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        for genre in genres.iter().filter_map(Value::as_str) {
            tables.artist_genres.push(ArtistGenreRow {
                time_range: range,
                rank,
                genre: genre.to_string(),
            });
        }
    }
}

/// Play events sorted by time; unparseable timestamps go last in input order.
pub fn flatten_plays(items: &[Value]) -> Vec<PlayEventRow> {
    let mut plays: Vec<PlayEventRow> = items
        .iter()
        .map(|item| {
            let track = &item["track"];
            PlayEventRow {
                played_at: item["played_at"].as_str().and_then(parse_timestamp),
                track_id: str_field(&track["id"]),
                track_name: str_field(&track["name"]).unwrap_or_default(),
                primary_artist: str_field(&track["artists"][0]["name"]),
                duration_ms: u64_field(&track["duration_ms"]),
            }
        })
        .collect();

    plays.sort_by(|a, b| match (a.played_at, b.played_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    plays
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_tracks_per_field() {
        let items = vec![
            json!({
                "id": "t1", "name": "Song", "duration_ms": 240000, "popularity": 80,
                "explicit": true, "album": {"name": "LP"},
                "artists": [{"id": "a1", "name": "Lead"}, {"id": "a2", "name": "Feat"}]
            }),
            json!({"id": "t2", "name": "Broken", "duration_ms": "long", "artists": "nobody"}),
            json!("not an object"),
        ];
        let mut tables = CuratedTables::default();
        flatten_tracks(TimeRange::MediumTerm, &items, &mut tables);

        assert_eq!(tables.tracks.len(), 3);
        let first = &tables.tracks[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.duration_min, Some(4.0));
        assert_eq!(first.album.as_deref(), Some("LP"));
        assert_eq!(tables.artists_of(TimeRange::MediumTerm, 1), vec!["Lead", "Feat"]);

        let broken = &tables.tracks[1];
        assert_eq!(broken.name, "Broken");
        assert_eq!(broken.duration_ms, None);
        assert_eq!(broken.duration_min, None);

        let junk = &tables.tracks[2];
        assert_eq!(junk.rank, 3);
        assert_eq!(junk.track_id, None);
        assert_eq!(tables.track_artists.len(), 2);
    }

    #[test]
    fn test_flatten_artists_genres() {
        let items = vec![json!({
            "id": "a1", "name": "Artist", "popularity": 55,
            "followers": {"total": 1200}, "genres": ["indie", 7, "dream pop"]
        })];
        let mut tables = CuratedTables::default();
        flatten_artists(TimeRange::LongTerm, &items, &mut tables);
        assert_eq!(tables.artists[0].followers, Some(1200));
        assert_eq!(tables.genres_of(TimeRange::LongTerm, 1), vec!["indie", "dream pop"]);
    }

    #[test]
    fn test_flatten_plays_sorted_bad_timestamps_last() {
        let items = vec![
            json!({"played_at": "garbage", "track": {"name": "C"}}),
            json!({"played_at": "2024-05-02T10:00:00.000Z", "track": {"name": "B",
                   "artists": [{"name": "Y"}], "duration_ms": 1000}}),
            json!({"played_at": "2024-05-01T08:00:00Z", "track": {"name": "A"}}),
        ];
        let plays = flatten_plays(&items);
        let names: Vec<&str> = plays.iter().map(|p| p.track_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(plays[1].primary_artist.as_deref(), Some("Y"));
        assert_eq!(plays[2].played_at, None);
    }

    #[test]
    fn test_no_raw_data() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = Normalizer::new(
            RawStore::new(dir.path().join("raw")),
            CuratedStore::new(dir.path().join("curated")),
            TimeRange::ALL.to_vec(),
        );
        assert!(matches!(normalizer.run(), Err(NormalizeError::NoRawData(_))));
    }

    #[test]
    fn test_missing_window_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let raw = RawStore::new(dir.path().join("raw"));
        raw.write(
            Endpoint::TopTracks,
            Some(TimeRange::ShortTerm),
            r#"{"items": [{"name": "Only", "duration_ms": 60000}]}"#,
        )
        .unwrap();
        let normalizer = Normalizer::new(
            raw,
            CuratedStore::new(dir.path().join("curated")),
            TimeRange::ALL.to_vec(),
        );
        let report = normalizer.run().unwrap();
        assert_eq!(report.tracks, 1);
        assert_eq!(report.plays, 0);
        // 2 track windows, 3 artist windows, recently played
        assert_eq!(report.missing.len(), 6);
        assert!(normalizer.curated().missing_files().is_empty());
    }

    #[test]
    fn test_corrupt_window_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let raw = RawStore::new(dir.path().join("raw"));
        raw.write(
            Endpoint::TopTracks,
            Some(TimeRange::ShortTerm),
            r#"{"items": [{"name": "Kept"}]}"#,
        )
        .unwrap();
        raw.write(Endpoint::RecentlyPlayed, None, r#"{"items": []}"#)
            .unwrap();
        let corrupt = raw.path_for(Endpoint::TopTracks, Some(TimeRange::LongTerm));
        std::fs::write(&corrupt, "{\"items\": [").unwrap();

        let normalizer = Normalizer::new(
            raw,
            CuratedStore::new(dir.path().join("curated")),
            vec![TimeRange::ShortTerm, TimeRange::LongTerm],
        );
        let report = normalizer.run().unwrap();
        assert_eq!(report.tracks, 1);
        assert!(report.missing.contains(&corrupt));
        // both artist windows plus the corrupt track window
        assert_eq!(report.missing.len(), 3);
    }
}
