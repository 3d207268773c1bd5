//! Raw response storage: one verbatim JSON file per (endpoint, window).

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::model::TimeRange;

/// The three Web API resources the fetcher persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TopTracks,
    TopArtists,
    RecentlyPlayed,
}

impl Endpoint {
    /// Path below the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::TopTracks => "/me/top/tracks",
            Self::TopArtists => "/me/top/artists",
            Self::RecentlyPlayed => "/me/player/recently-played",
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            Self::TopTracks => "top_tracks",
            Self::TopArtists => "top_artists",
            Self::RecentlyPlayed => "recently_played",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawStore {
    dir: PathBuf,
}

impl RawStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `top_tracks_short_term.json`, `recently_played.json`, ...
    pub fn path_for(&self, endpoint: Endpoint, range: Option<TimeRange>) -> PathBuf {
        let name = match range {
            Some(r) => format!("{}_{}.json", endpoint.file_stem(), r.as_str()),
            None => format!("{}.json", endpoint.file_stem()),
        };
        self.dir.join(name)
    }

    /// Overwrite the raw file for `(endpoint, range)` with `body` as received.
    pub fn write(
        &self,
        endpoint: Endpoint,
        range: Option<TimeRange>,
        body: &str,
    ) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating raw dir {}", self.dir.display()))?;
        let path = self.path_for(endpoint, range);
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!("Saved raw response: {}", path.display());
        Ok(path)
    }

    /// Parsed contents of a raw file, or `None` when it was never fetched.
    pub fn read(
        &self,
        endpoint: Endpoint,
        range: Option<TimeRange>,
    ) -> anyhow::Result<Option<serde_json::Value>> {
        let path = self.path_for(endpoint, range);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(value))
    }
}
