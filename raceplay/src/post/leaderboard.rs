use crate::interfaces::ui_interface::RgbColor;
use helpers::general::format_race_time;
use serde::Serialize;
use std::time::Duration;

/// FinishEntry is one competitor that crossed the finish line.
/// * `competitor` - Index of the competitor in the race result
/// * `elapsed_ms` - (ms) Wall-clock time between race start and finish
/// * `time_label` - `elapsed_ms` formatted as race clock time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishEntry {
    pub competitor: usize,
    pub algorithm_name: String,
    pub color: String,
    pub elapsed_ms: u64,
    pub time_label: String,
}

impl FinishEntry {
    pub fn new(competitor: usize, algorithm_name: &str, color: &str, elapsed: Duration) -> Self {
        let elapsed_ms = elapsed.as_millis() as u64;
        FinishEntry {
            competitor,
            algorithm_name: algorithm_name.to_owned(),
            color: color.to_owned(),
            elapsed_ms,
            time_label: format_race_time(elapsed_ms),
        }
    }
}

/// record_finish adds a finisher and keeps the list sorted by elapsed time. Finishers with equal
/// times stay in the order they were recorded. Returns the 1-based rank of the new entry.
pub fn record_finish(finished: &mut Vec<FinishEntry>, entry: FinishEntry) -> usize {
    // same result as appending and stable-sorting
    let pos = finished.partition_point(|e| e.elapsed_ms <= entry.elapsed_ms);
    finished.insert(pos, entry);
    pos + 1
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub algorithm_name: String,
    pub color: RgbColor,
    pub time_label: String,
}

/// leaderboard_rows projects the sorted finisher list onto ranked display rows.
pub fn leaderboard_rows(finished: &[FinishEntry]) -> Vec<LeaderboardRow> {
    finished
        .iter()
        .enumerate()
        .map(|(i, e)| LeaderboardRow {
            rank: i + 1,
            algorithm_name: e.algorithm_name.to_owned(),
            color: RgbColor::parse_or_grey(&e.color),
            time_label: e.time_label.to_owned(),
        })
        .collect()
}
