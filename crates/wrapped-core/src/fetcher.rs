use std::path::PathBuf;

use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::config::FetchConfig;
use crate::raw::{Endpoint, RawStore};

/// Files written by one fetch run.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub written: Vec<PathBuf>,
}

/// Pulls top tracks / top artists per window and recent plays, persisting
/// every response verbatim. Requests are issued one after another.
pub struct Fetcher<'a> {
    api: &'a ApiClient,
    store: &'a RawStore,
    config: &'a FetchConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl FetchError {
    /// The run stopped because the token was rejected.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}

impl<'a> Fetcher<'a> {
    pub fn new(api: &'a ApiClient, store: &'a RawStore, config: &'a FetchConfig) -> Self {
        Self { api, store, config }
    }

    pub async fn run(&self) -> Result<FetchReport, FetchError> {
        let mut report = FetchReport::default();

        for endpoint in [Endpoint::TopTracks, Endpoint::TopArtists] {
            for &range in &self.config.time_ranges {
                info!("Fetching {:?} ({})", endpoint, range);
                let body = self
                    .api
                    .top_items(endpoint, range, self.config.top_limit)
                    .await?;
                report.written.push(self.store.write(endpoint, Some(range), &body)?);
            }
        }

        info!("Fetching recently played (limit {})", self.config.recent_limit);
        let body = self.api.recently_played(self.config.recent_limit).await?;
        report
            .written
            .push(self.store.write(Endpoint::RecentlyPlayed, None, &body)?);

        info!("Fetched {} raw files into {}", report.written.len(), self.store.dir().display());
        Ok(report)
    }
}
