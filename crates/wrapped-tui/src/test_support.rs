use wrapped_core::dashboard::Dashboard;
use wrapped_core::model::{
    parse_timestamp, ArtistGenreRow, ArtistRow, CuratedTables, PlayEventRow, TimeRange,
    TrackArtistRow, TrackRow,
};

fn track(range: TimeRange, rank: u32, name: &str, minutes: f64) -> TrackRow {
    TrackRow {
        time_range: range,
        rank,
        track_id: Some(format!("t{}", rank)),
        name: name.to_string(),
        album: Some("Loveless".to_string()),
        duration_ms: Some((minutes * 60000.0) as u64),
        duration_min: Some(minutes),
        popularity: Some(70),
        explicit: Some(false),
    }
}

fn lead(range: TimeRange, rank: u32, name: &str) -> TrackArtistRow {
    TrackArtistRow {
        time_range: range,
        rank,
        position: 0,
        artist_id: None,
        name: name.to_string(),
    }
}

fn play(ts: &str) -> PlayEventRow {
    PlayEventRow {
        played_at: parse_timestamp(ts),
        track_id: None,
        track_name: "Sometimes".to_string(),
        primary_artist: Some("My Bloody Valentine".to_string()),
        duration_ms: Some(319000),
    }
}

/// Two windows of top tracks, one top artist, three plays.
pub fn sample_tables() -> CuratedTables {
    CuratedTables {
        tracks: vec![
            track(TimeRange::ShortTerm, 1, "Sometimes", 5.3),
            track(TimeRange::ShortTerm, 2, "Alison", 3.9),
            track(TimeRange::LongTerm, 1, "Sometimes", 5.3),
        ],
        track_artists: vec![
            lead(TimeRange::ShortTerm, 1, "My Bloody Valentine"),
            lead(TimeRange::ShortTerm, 2, "Slowdive"),
            lead(TimeRange::LongTerm, 1, "My Bloody Valentine"),
        ],
        artists: vec![ArtistRow {
            time_range: TimeRange::ShortTerm,
            rank: 1,
            artist_id: None,
            name: "Slowdive".to_string(),
            popularity: Some(65),
            followers: Some(1_250_000),
        }],
        artist_genres: vec![
            ArtistGenreRow {
                time_range: TimeRange::ShortTerm,
                rank: 1,
                genre: "shoegaze".to_string(),
            },
            ArtistGenreRow {
                time_range: TimeRange::ShortTerm,
                rank: 1,
                genre: "dream pop".to_string(),
            },
        ],
        plays: vec![
            play("2024-03-01T09:15:00Z"),
            play("2024-03-01T09:45:00Z"),
            play("2024-03-02T14:00:00Z"),
        ],
    }
}

pub fn sample_dashboard() -> Dashboard {
    Dashboard::from_tables(&sample_tables())
}
