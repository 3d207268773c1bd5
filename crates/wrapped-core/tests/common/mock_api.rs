#![allow(dead_code)]

//! Local stand-in for the Web API, serving canned top items and plays.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use wrapped_core::config::{Config, PathsConfig};

pub const TOKEN: &str = "test-token";

/// What the mock should do with the first N requests to recently-played.
#[derive(Debug, Clone, Copy, Default)]
pub enum Behaviour {
    #[default]
    Ok,
    /// Answer 429 with `Retry-After: 0` this many times, then succeed.
    RateLimited(usize),
    /// Always 401.
    Unauthorized,
}

#[derive(Clone)]
struct MockState {
    behaviour: Behaviour,
    recent_calls: Arc<AtomicUsize>,
}

pub struct MockApi {
    pub addr: SocketAddr,
    pub recent_calls: Arc<AtomicUsize>,
}

impl MockApi {
    pub async fn start(behaviour: Behaviour) -> Self {
        let recent_calls = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            behaviour,
            recent_calls: recent_calls.clone(),
        };
        let app = Router::new()
            .route("/me/top/tracks", get(top_tracks))
            .route("/me/top/artists", get(top_artists))
            .route("/me/player/recently-played", get(recently_played))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, recent_calls }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    /// Config pointing at this server with every data path under `root`.
    pub fn config(&self, root: &Path) -> Config {
        let mut config = Config::default();
        config.api.base_url = self.base_url();
        config.fetch.default_retry_after_secs = 0;
        config.paths = PathsConfig::rooted_at(root);
        config
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

fn range_of(params: &HashMap<String, String>) -> String {
    params
        .get("time_range")
        .cloned()
        .unwrap_or_else(|| "medium_term".to_string())
}

async fn top_tracks(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(tracks_page(&range_of(&params))).into_response()
}

async fn top_artists(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(artists_page(&range_of(&params))).into_response()
}

async fn recently_played(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let call = state.recent_calls.fetch_add(1, Ordering::SeqCst);
    match state.behaviour {
        Behaviour::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
        Behaviour::RateLimited(n) if call < n => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", "0")],
                "slow down",
            )
                .into_response();
        }
        _ => {}
    }
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(recent_page()).into_response()
}

/// Two tracks per window. "Shared Song" by "Shared Artist" appears in every
/// window; the other track is window-specific.
pub fn tracks_page(range: &str) -> Value {
    json!({
        "items": [
            {
                "id": "shared",
                "name": "Shared Song",
                "duration_ms": 180000,
                "popularity": 70,
                "explicit": false,
                "album": {"name": "Shared Album"},
                "artists": [{"id": "a-shared", "name": "Shared Artist"}]
            },
            {
                "id": format!("only-{range}"),
                "name": format!("Song {range}"),
                "duration_ms": 240000,
                "popularity": 40,
                "explicit": true,
                "album": {"name": "Other Album"},
                "artists": [
                    {"id": format!("a-{range}"), "name": format!("Artist {range}")},
                    {"id": "a-shared", "name": "Shared Artist"}
                ]
            }
        ],
        "total": 2,
        "limit": 50
    })
}

pub fn artists_page(range: &str) -> Value {
    json!({
        "items": [
            {
                "id": "a-shared",
                "name": "Shared Artist",
                "popularity": 65,
                "followers": {"total": 1000},
                "genres": ["dream pop", "shoegaze"]
            },
            {
                "id": format!("a-{range}"),
                "name": format!("Artist {range}"),
                "popularity": 30,
                "followers": {"total": 10},
                "genres": ["shoegaze"]
            }
        ]
    })
}

/// Three plays: two at 09:xx UTC, one at 14:00 UTC, deliberately out of order.
pub fn recent_page() -> Value {
    json!({
        "items": [
            {
                "played_at": "2024-03-02T14:00:00.000Z",
                "track": {"id": "shared", "name": "Shared Song", "duration_ms": 180000,
                          "artists": [{"name": "Shared Artist"}]}
            },
            {
                "played_at": "2024-03-01T09:15:00.123Z",
                "track": {"id": "x", "name": "Morning", "duration_ms": 200000,
                          "artists": [{"name": "Early Bird"}]}
            },
            {
                "played_at": "2024-03-01T09:45:00Z",
                "track": {"id": "y", "name": "Coffee", "duration_ms": 210000,
                          "artists": [{"name": "Early Bird"}]}
            }
        ]
    })
}
