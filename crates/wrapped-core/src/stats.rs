//! Descriptive statistics over curated rows.
//!
//! Frequency tables keep first-occurrence order among equal counts, so a
//! top-N cut is deterministic for a given input order.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::{CuratedTables, PlayEventRow};

pub const TOP_AGGREGATE: usize = 10;
pub const TOP_SUMMARY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub label: String,
    pub count: u64,
}

impl Count {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Count occurrences, most frequent first; ties keep first-seen order.
/// Empty labels are ignored.
pub fn frequency<'a, I>(items: I) -> Vec<Count>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<Count> = Vec::new();
    for item in items {
        if item.is_empty() {
            continue;
        }
        match index.get(item) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(item, counts.len());
                counts.push(Count::new(item, 1));
            }
        }
    }
    // sort_by is stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_n(counts: &[Count], n: usize) -> Vec<Count> {
    counts.iter().take(n).cloned().collect()
}

/// Plays per hour of day (UTC), only hours that occur.
pub fn hourly_counts(plays: &[PlayEventRow]) -> BTreeMap<u32, u64> {
    let mut out = BTreeMap::new();
    for ts in plays.iter().filter_map(|p| p.played_at) {
        *out.entry(ts.hour()).or_insert(0) += 1;
    }
    out
}

/// 24 buckets, zero-filled.
pub fn hourly_histogram(hourly: &BTreeMap<u32, u64>) -> [u64; 24] {
    let mut buckets = [0u64; 24];
    for (&hour, &count) in hourly {
        if let Some(slot) = buckets.get_mut(hour as usize) {
            *slot = count;
        }
    }
    buckets
}

/// Hour with the most plays. On a tie the lowest hour wins.
pub fn most_active_hour(hourly: &BTreeMap<u32, u64>) -> Option<u32> {
    let mut best: Option<(u32, u64)> = None;
    for (&hour, &count) in hourly {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((hour, count)),
        }
    }
    best.map(|(hour, _)| hour)
}

/// Plays per calendar date (UTC).
pub fn daily_counts(plays: &[PlayEventRow]) -> BTreeMap<NaiveDate, u64> {
    let mut out = BTreeMap::new();
    for ts in plays.iter().filter_map(|p| p.played_at) {
        *out.entry(ts.date_naive()).or_insert(0) += 1;
    }
    out
}

/// `describe()`-style summary of track durations in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl DurationStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        });

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }

    /// Rows of `duration_stats.csv`, in `describe()` order.
    pub fn metrics(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("count", Some(self.count as f64)),
            ("mean", Some(self.mean)),
            ("std", self.std),
            ("min", Some(self.min)),
            ("25%", Some(self.q1)),
            ("50%", Some(self.median)),
            ("75%", Some(self.q3)),
            ("max", Some(self.max)),
        ]
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Histogram of durations in whole-minute buckets (`"3-4"` = [3, 4) minutes).
pub fn duration_buckets(values: &[f64]) -> Vec<Count> {
    let mut buckets: BTreeMap<u64, u64> = BTreeMap::new();
    for v in values.iter().filter(|v| v.is_finite() && **v >= 0.0) {
        *buckets.entry(v.floor() as u64).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(lo, count)| Count::new(format!("{}-{}", lo, lo + 1), count))
        .collect()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Every aggregate derived from the row tables. Frequency tables are
/// complete here; top-N cuts are taken when writing or displaying.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub genres: Vec<Count>,
    pub artist_frequency: Vec<Count>,
    pub hourly: BTreeMap<u32, u64>,
    pub daily: BTreeMap<NaiveDate, u64>,
    pub durations: Option<DurationStats>,
}

impl Aggregates {
    pub fn compute(tables: &CuratedTables) -> Self {
        let minutes = duration_minutes(tables);
        Self {
            genres: frequency(tables.artist_genres.iter().map(|g| g.genre.as_str())),
            artist_frequency: frequency(tables.primary_artists()),
            hourly: hourly_counts(&tables.plays),
            daily: daily_counts(&tables.plays),
            durations: DurationStats::from_values(&minutes),
        }
    }

    pub fn hourly_as_counts(&self) -> Vec<Count> {
        self.hourly
            .iter()
            .map(|(h, c)| Count::new(h.to_string(), *c))
            .collect()
    }

    pub fn daily_as_counts(&self) -> Vec<Count> {
        self.daily
            .iter()
            .map(|(d, c)| Count::new(d.format("%Y-%m-%d").to_string(), *c))
            .collect()
    }
}

pub fn duration_minutes(tables: &CuratedTables) -> Vec<f64> {
    tables.tracks.iter().filter_map(|t| t.duration_min).collect()
}

/// Contents of `wrapped_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_minutes_top_tracks: f64,
    pub top_5_tracks: Vec<String>,
    pub top_5_artists: Vec<String>,
    pub most_active_hour: Option<u32>,
}

impl Summary {
    pub fn compute(tables: &CuratedTables, aggregates: &Aggregates) -> Self {
        let total: f64 = duration_minutes(tables).iter().sum();
        let labels = |counts: Vec<Count>| counts.into_iter().map(|c| c.label).collect();
        Self {
            total_minutes_top_tracks: round2(total),
            top_5_tracks: labels(top_n(
                &frequency(tables.tracks.iter().map(|t| t.name.as_str())),
                TOP_SUMMARY,
            )),
            top_5_artists: labels(top_n(&aggregates.artist_frequency, TOP_SUMMARY)),
            most_active_hour: most_active_hour(&aggregates.hourly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    fn play(ts: &str) -> PlayEventRow {
        PlayEventRow {
            played_at: parse_timestamp(ts),
            track_id: None,
            track_name: "t".into(),
            primary_artist: None,
            duration_ms: None,
        }
    }

    #[test]
    fn test_frequency_ties_keep_first_seen_order() {
        let counts = frequency(["b", "a", "a", "c", "b", "", "d"]);
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c", "d"]);
        assert_eq!(counts[0].count, 2);
        // empty labels do not contribute
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 6);
    }

    #[test]
    fn test_hourly_and_most_active() {
        let plays = vec![
            play("2024-01-01T09:00:00Z"),
            play("2024-01-01T09:30:00Z"),
            play("2024-01-02T14:00:00Z"),
            play("not a time"),
        ];
        let hourly = hourly_counts(&plays);
        assert_eq!(hourly, BTreeMap::from([(9, 2), (14, 1)]));
        assert_eq!(most_active_hour(&hourly), Some(9));

        let hist = hourly_histogram(&hourly);
        assert_eq!(hist.len(), 24);
        assert_eq!(hist[9], 2);
        assert_eq!(hist[0], 0);
        assert_eq!(hist.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_most_active_hour_tie_lowest_wins() {
        let hourly = BTreeMap::from([(22, 3), (7, 3), (12, 1)]);
        assert_eq!(most_active_hour(&hourly), Some(7));
        assert_eq!(most_active_hour(&BTreeMap::new()), None);
    }

    #[test]
    fn test_daily_counts_sum() {
        let plays = vec![
            play("2024-01-01T23:59:00Z"),
            play("2024-01-02T00:01:00Z"),
            play("2024-01-02T10:00:00Z"),
        ];
        let daily = daily_counts(&plays);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily.values().sum::<u64>(), plays.len() as u64);
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(daily[&d2], 2);
    }

    #[test]
    fn test_duration_stats_describe() {
        let stats = DurationStats::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.max, 4.0);
        let std = stats.std.unwrap();
        assert!((std - 1.2909944487).abs() < 1e-9);
    }

    #[test]
    fn test_duration_stats_single_and_empty() {
        let one = DurationStats::from_values(&[3.5]).unwrap();
        assert_eq!(one.std, None);
        assert_eq!(one.median, 3.5);
        assert!(DurationStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_duration_buckets() {
        let buckets = duration_buckets(&[2.1, 2.9, 3.0, 7.5]);
        assert_eq!(
            buckets,
            vec![Count::new("2-3", 2), Count::new("3-4", 1), Count::new("7-8", 1)]
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
