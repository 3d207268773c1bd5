//! Shared pieces of the listening-history pipeline: configuration, the Web API
//! client and fetcher, the raw → curated normalizer, statistics, and the
//! dashboard model consumed by the terminal presenter.

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod curated;
pub mod dashboard;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod platform;
pub mod provider;
pub mod raw;
pub mod stats;
