//! Curated flat files: writing them after normalization and reading them back
//! defensively for the dashboard.
//!
//! The reader tolerates files edited or produced by other tools:
//! - one accidental header row repeated as data is dropped;
//! - a file whose every line was quoted into a single cell is re-split;
//! - a `label,count` file that only carries labels counts each label once;
//! - typed rows that do not deserialize are skipped with a warning.
//!
//! Header names are trimmed. Data cells are returned exactly as stored.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::CuratedTables;
use crate::stats::{Aggregates, Count, Summary, TOP_AGGREGATE};

pub const TOP_TRACKS: &str = "top_tracks.csv";
pub const TRACK_ARTISTS: &str = "track_artists.csv";
pub const TOP_ARTISTS: &str = "top_artists.csv";
pub const ARTIST_GENRES: &str = "artist_genres.csv";
pub const RECENTLY_PLAYED: &str = "recently_played.csv";
pub const GENRE_SUMMARY: &str = "genre_summary.csv";
pub const ARTIST_FREQUENCY: &str = "artist_frequency.csv";
pub const LISTENING_BY_HOUR: &str = "listening_by_hour.csv";
pub const LISTENING_DAILY: &str = "listening_daily.csv";
pub const DURATION_STATS: &str = "duration_stats.csv";
pub const SUMMARY: &str = "wrapped_summary.json";

/// Every file a complete curated directory contains.
pub const ALL_FILES: [&str; 11] = [
    TOP_TRACKS,
    TRACK_ARTISTS,
    TOP_ARTISTS,
    ARTIST_GENRES,
    RECENTLY_PLAYED,
    GENRE_SUMMARY,
    ARTIST_FREQUENCY,
    LISTENING_BY_HOUR,
    LISTENING_DAILY,
    DURATION_STATS,
    SUMMARY,
];

const TRACK_HEADERS: &[&str] = &[
    "time_range",
    "rank",
    "track_id",
    "name",
    "album",
    "duration_ms",
    "duration_min",
    "popularity",
    "explicit",
];
const TRACK_ARTIST_HEADERS: &[&str] = &["time_range", "rank", "position", "artist_id", "name"];
const ARTIST_HEADERS: &[&str] = &[
    "time_range",
    "rank",
    "artist_id",
    "name",
    "popularity",
    "followers",
];
const ARTIST_GENRE_HEADERS: &[&str] = &["time_range", "rank", "genre"];
const PLAY_HEADERS: &[&str] = &[
    "played_at",
    "track_id",
    "track_name",
    "primary_artist",
    "duration_ms",
];

/// Header of a two-column aggregate file.
pub fn count_header(name: &str) -> [&'static str; 2] {
    match name {
        GENRE_SUMMARY => ["genre", "count"],
        ARTIST_FREQUENCY => ["artist", "count"],
        LISTENING_BY_HOUR => ["hour", "count"],
        LISTENING_DAILY => ["date", "count"],
        DURATION_STATS => ["metric", "value"],
        _ => ["label", "count"],
    }
}

#[derive(Debug, Clone)]
pub struct CuratedStore {
    dir: PathBuf,
}

impl CuratedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Expected files that are not on disk.
    pub fn missing_files(&self) -> Vec<&'static str> {
        ALL_FILES
            .iter()
            .copied()
            .filter(|name| !self.path(name).exists())
            .collect()
    }

    /// Write every row table, aggregate file and the summary, replacing
    /// whatever was there.
    pub fn write_all(
        &self,
        tables: &CuratedTables,
        aggregates: &Aggregates,
        summary: &Summary,
    ) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating curated dir {}", self.dir.display()))?;

        let mut written = vec![
            self.write_rows(TOP_TRACKS, TRACK_HEADERS, &tables.tracks)?,
            self.write_rows(TRACK_ARTISTS, TRACK_ARTIST_HEADERS, &tables.track_artists)?,
            self.write_rows(TOP_ARTISTS, ARTIST_HEADERS, &tables.artists)?,
            self.write_rows(ARTIST_GENRES, ARTIST_GENRE_HEADERS, &tables.artist_genres)?,
            self.write_rows(RECENTLY_PLAYED, PLAY_HEADERS, &tables.plays)?,
        ];

        let top = |counts: &[Count]| counts.iter().take(TOP_AGGREGATE).cloned().collect::<Vec<_>>();
        written.push(self.write_counts(GENRE_SUMMARY, &top(&aggregates.genres))?);
        written.push(self.write_counts(ARTIST_FREQUENCY, &top(&aggregates.artist_frequency))?);
        written.push(self.write_counts(LISTENING_BY_HOUR, &aggregates.hourly_as_counts())?);
        written.push(self.write_counts(LISTENING_DAILY, &aggregates.daily_as_counts())?);

        let metrics = aggregates
            .durations
            .as_ref()
            .map(|d| d.metrics())
            .unwrap_or_default();
        written.push(self.write_metrics(&metrics)?);

        let path = self.path(SUMMARY);
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
        written.push(path);

        info!("Wrote {} curated files to {}", written.len(), self.dir.display());
        Ok(written)
    }

    fn write_rows<T: Serialize>(
        &self,
        name: &str,
        headers: &[&str],
        rows: &[T],
    ) -> anyhow::Result<PathBuf> {
        let path = self.path(name);
        // Header is written by hand so empty tables still carry one.
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!("{}: {} rows", name, rows.len());
        Ok(path)
    }

    fn write_counts(&self, name: &str, counts: &[Count]) -> anyhow::Result<PathBuf> {
        let path = self.path(name);
        let mut writer = WriterBuilder::new()
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(count_header(name))?;
        for c in counts {
            writer.write_record([c.label.as_str(), c.count.to_string().as_str()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    fn write_metrics(&self, metrics: &[(&str, Option<f64>)]) -> anyhow::Result<PathBuf> {
        let path = self.path(DURATION_STATS);
        let mut writer = WriterBuilder::new()
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(count_header(DURATION_STATS))?;
        for (metric, value) in metrics {
            // Undefined metrics are left out rather than written empty.
            if let Some(v) = value {
                writer.write_record([metric.to_string(), v.to_string()])?;
            }
        }
        writer.flush()?;
        Ok(path)
    }

    /// Read all five row tables.
    pub fn load_tables(&self) -> anyhow::Result<CuratedTables> {
        Ok(CuratedTables {
            tracks: self.load_rows(TOP_TRACKS)?,
            track_artists: self.load_rows(TRACK_ARTISTS)?,
            artists: self.load_rows(TOP_ARTISTS)?,
            artist_genres: self.load_rows(ARTIST_GENRES)?,
            plays: self.load_rows(RECENTLY_PLAYED)?,
        })
    }

    pub fn load_rows<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Vec<T>> {
        let table = read_table(&self.path(name))?;
        Ok(typed_rows(&table, name))
    }

    /// Read a `label,count` aggregate file.
    pub fn load_counts(&self, name: &str) -> anyhow::Result<Vec<Count>> {
        let table = read_table(&self.path(name))?;
        Ok(count_rows(&table, name))
    }

    /// Read `duration_stats.csv` as `(metric, value)` pairs.
    pub fn load_metrics(&self) -> anyhow::Result<Vec<(String, f64)>> {
        let table = read_table(&self.path(DURATION_STATS))?;
        let mut out = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            let metric = row.get(0).unwrap_or_default();
            match row.get(1).unwrap_or_default().trim().parse::<f64>() {
                Ok(v) if !metric.trim().is_empty() => out.push((metric.to_string(), v)),
                _ => warn!("Skipping row {} of {}: {:?}", i + 1, DURATION_STATS, row),
            }
        }
        Ok(out)
    }

    pub fn load_summary(&self) -> anyhow::Result<Summary> {
        let path = self.path(SUMMARY);
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

/// A delimited file as plain string records, header separated out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

pub fn read_table(path: &Path) -> anyhow::Result<Table> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_table(file).with_context(|| format!("reading {}", path.display()))
}

/// Parse delimited text and apply the repairs listed in the module docs.
pub fn parse_table(input: impl Read) -> anyhow::Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.records();
    let headers = match records.next() {
        Some(first) => trimmed(&first?),
        None => return Ok(Table::default()),
    };
    let rows = records.collect::<Result<Vec<_>, _>>()?;

    let mut table = Table { headers, rows };
    if split_single_column(&mut table) {
        debug!("Re-split single-column table into {} columns", table.headers.len());
    }
    if strip_repeated_header(&mut table) {
        debug!("Dropped repeated header row");
    }
    Ok(table)
}

fn trimmed(record: &StringRecord) -> StringRecord {
    record.iter().map(str::trim).collect()
}

/// Drop the first data row matching the header (ignoring edge whitespace).
/// Only one is removed.
fn strip_repeated_header(table: &mut Table) -> bool {
    let is_header = |row: &StringRecord| {
        row.len() == table.headers.len()
            && row.iter().zip(table.headers.iter()).all(|(a, b)| a.trim() == b)
    };
    match table.rows.iter().position(is_header) {
        Some(i) => {
            table.rows.remove(i);
            true
        }
        None => false,
    }
}

/// A file whose lines were each quoted whole comes back as one column of
/// comma-separated text. Split every cell back into fields.
fn split_single_column(table: &mut Table) -> bool {
    if table.headers.len() != 1 {
        return false;
    }
    let header = table.headers.get(0).unwrap_or_default();
    if !header.contains(',') {
        return false;
    }
    table.headers = trimmed(&split_cell(header));
    for row in &mut table.rows {
        if row.len() == 1 {
            *row = split_cell(row.get(0).unwrap_or_default());
        }
    }
    true
}

fn split_cell(cell: &str) -> StringRecord {
    ReaderBuilder::new()
        .has_headers(false)
        .from_reader(cell.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .unwrap_or_else(|| StringRecord::from(vec![cell]))
}

/// Deserialize rows by header name, skipping (and logging) any that fail.
pub fn typed_rows<T: DeserializeOwned>(table: &Table, name: &str) -> Vec<T> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        match row.deserialize::<T>(Some(&table.headers)) {
            Ok(v) => out.push(v),
            Err(e) => warn!("Skipping row {} of {}: {}", i + 1, name, e),
        }
    }
    out
}

/// `label,count` pairs. A missing or empty count cell counts as one; a
/// non-numeric count skips the row.
pub fn count_rows(table: &Table, name: &str) -> Vec<Count> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let label = row.get(0).unwrap_or_default();
        if label.trim().is_empty() {
            continue;
        }
        let count = match row.get(1).map(str::trim).filter(|c| !c.is_empty()) {
            None => 1,
            Some(c) => match c.parse::<u64>() {
                Ok(n) => n,
                Err(_) => {
                    warn!("Skipping row {} of {}: bad count {:?}", i + 1, name, c);
                    continue;
                }
            },
        };
        out.push(Count::new(label, count));
    }
    out
}
