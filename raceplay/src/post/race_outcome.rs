use crate::post::leaderboard::FinishEntry;
use crate::pre::race_data::RaceResult;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

/// OutcomeRow is one finisher of the final classification.
/// * `travel_time_s` - (s) Simulated travel time used for the playback
/// * `point_count` - Number of points of the flown path
/// * `move_count` - Moves reported by the backend, if any
/// * `computation_time_ms` - (ms) Backend computation time, if reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRow {
    pub rank: usize,
    pub algorithm_name: String,
    pub color: String,
    pub time_label: String,
    pub elapsed_ms: u64,
    pub travel_time_s: f64,
    pub point_count: usize,
    pub move_count: Option<u32>,
    pub computation_time_ms: Option<u64>,
}

/// RaceOutcome contains all information about a finished race that is required for
/// post-processing the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceOutcome {
    pub race_id: Option<String>,
    pub rows: Vec<OutcomeRow>,
    pub excluded: Vec<String>,
}

impl RaceOutcome {
    pub fn from_finishers(
        race: &RaceResult,
        finished: &[FinishEntry],
        excluded: &[usize],
        default_travel_time_s: f64,
    ) -> RaceOutcome {
        let rows = finished
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let competitor = race.competitors.get(e.competitor)?;
                Some(OutcomeRow {
                    rank: i + 1,
                    algorithm_name: e.algorithm_name.to_owned(),
                    color: e.color.to_owned(),
                    time_label: e.time_label.to_owned(),
                    elapsed_ms: e.elapsed_ms,
                    travel_time_s: competitor.travel_time_s(default_travel_time_s),
                    point_count: competitor.point_count(),
                    move_count: competitor.move_count,
                    computation_time_ms: competitor.computation_time_ms,
                })
            })
            .collect();

        RaceOutcome {
            race_id: race.race_id.to_owned(),
            rows,
            excluded: excluded
                .iter()
                .filter_map(|&i| race.competitors.get(i))
                .map(|c| c.algorithm_name.to_owned())
                .collect(),
        }
    }

    /// format_leaderboard renders the final classification as a text table.
    pub fn format_leaderboard(&self) -> String {
        let mut lines = vec![
            format!("RESULT: Race {}", self.race_id.as_deref().unwrap_or("(no id)")),
            format!(
                "{:>4}  {:<28} {:>9} {:>10} {:>7}",
                "pos", "algorithm", "time", "sim. time", "points"
            ),
        ];
        lines.extend(self.rows.iter().map(|row| {
            format!(
                "{:>4}  {:<28} {:>9} {:>9.1}s {:>7}",
                row.rank, row.algorithm_name, row.time_label, row.travel_time_s, row.point_count
            )
        }));
        lines.extend(
            self.excluded
                .iter()
                .map(|name| format!("{:>4}  {:<28} {:>9}", "-", name, "DNS")),
        );

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// print_leaderboard prints the final classification to the console output.
    pub fn print_leaderboard(&self) {
        print!("{}", self.format_leaderboard());
    }

    /// write_csv writes one line per finisher to the given CSV file.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .context(format!("Failed to create CSV file {}!", path.display()))?;
        for row in self.rows.iter() {
            wtr.serialize(row)
                .context(format!("Failed to write CSV file {}!", path.display()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
