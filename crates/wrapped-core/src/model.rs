//! Curated row types and the time-window label shared by every stage.
//!
//! Nested API structures (a track's artist list, an artist's genre list) are
//! stored as child tables keyed by `(time_range, rank)` instead of text blobs
//! embedded in a cell.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listening window understood by the top-items endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [Self::ShortTerm, Self::MediumTerm, Self::LongTerm];

    /// Label used in query strings, raw file names and curated rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }

    /// Human label for the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Self::ShortTerm => "4 weeks",
            Self::MediumTerm => "6 months",
            Self::LongTerm => "all time",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "short_term" | "short" => Ok(Self::ShortTerm),
            "medium_term" | "medium" => Ok(Self::MediumTerm),
            "long_term" | "long" => Ok(Self::LongTerm),
            other => anyhow::bail!("unknown time range: {other}"),
        }
    }
}

/// One row of `top_tracks.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRow {
    pub time_range: TimeRange,
    pub rank: u32,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub duration_min: Option<f64>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub explicit: Option<bool>,
}

/// One (track row, artist) pair of `track_artists.csv`. Position 0 is the
/// primary artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArtistRow {
    pub time_range: TimeRange,
    pub rank: u32,
    pub position: u32,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// One row of `top_artists.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRow {
    pub time_range: TimeRange,
    pub rank: u32,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub followers: Option<u64>,
}

/// One (artist row, genre) pair of `artist_genres.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistGenreRow {
    pub time_range: TimeRange,
    pub rank: u32,
    pub genre: String,
}

/// One row of `recently_played.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEventRow {
    #[serde(default, with = "opt_rfc3339")]
    pub played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub primary_artist: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Every row table the normalizer produces, in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedTables {
    pub tracks: Vec<TrackRow>,
    pub track_artists: Vec<TrackArtistRow>,
    pub artists: Vec<ArtistRow>,
    pub artist_genres: Vec<ArtistGenreRow>,
    pub plays: Vec<PlayEventRow>,
}

impl CuratedTables {
    /// Primary artist name of every track row, in track-row order. Rows
    /// without an artist are skipped.
    pub fn primary_artists(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            if let Some(a) = self
                .track_artists
                .iter()
                .find(|a| a.position == 0 && a.time_range == track.time_range && a.rank == track.rank)
            {
                if !a.name.is_empty() {
                    out.push(a.name.as_str());
                }
            }
        }
        out
    }

    pub fn artists_of(&self, time_range: TimeRange, rank: u32) -> Vec<&str> {
        let mut rows: Vec<&TrackArtistRow> = self
            .track_artists
            .iter()
            .filter(|a| a.time_range == time_range && a.rank == rank)
            .collect();
        rows.sort_by_key(|a| a.position);
        rows.into_iter().map(|a| a.name.as_str()).collect()
    }

    pub fn genres_of(&self, time_range: TimeRange, rank: u32) -> Vec<&str> {
        self.artist_genres
            .iter()
            .filter(|g| g.time_range == time_range && g.rank == rank)
            .map(|g| g.genre.as_str())
            .collect()
    }
}

/// Serialize as RFC 3339 with millisecond precision; empty cell for `None`.
mod opt_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(ts) => s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

/// Parse an API timestamp (`2024-03-01T09:15:00.123Z`) into UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
