use raceplay::interfaces::ui_interface::{UiSink, UiUpdate};
use tracing::{debug, info, trace};

/// Presenter renders UI updates as log lines. It is the terminal counterpart of the status
/// bar, countdown overlay, race clock, commentary feed and leaderboard widgets.
#[derive(Debug, Default)]
pub struct Presenter {
    last_clock: Option<String>,
}

impl Presenter {
    pub fn new() -> Presenter {
        Presenter::default()
    }

    pub fn show(&mut self, update: &UiUpdate) {
        match update {
            UiUpdate::Status(status) => info!("Status: {}", status.label()),
            UiUpdate::Countdown(Some(label)) => info!("{}", label),
            UiUpdate::Countdown(None) => {}
            UiUpdate::Clock(label) => {
                trace!("Race clock {}", label);
                self.last_clock = Some(label.to_owned());
            }
            UiUpdate::Commentary(entry) => {
                let marker = if entry.highlight { "*" } else { " " };
                info!("{} [{}] {}", marker, entry.time_label, entry.text);
            }
            UiUpdate::Leaderboard(rows) => {
                for row in rows.iter() {
                    debug!(
                        "  P{:<2} {:<24} {}",
                        row.rank, row.algorithm_name, row.time_label
                    );
                }
            }
            UiUpdate::AnalysisAvailable(toggles) => {
                for toggle in toggles.iter() {
                    info!(
                        "Path analysis {}: {} ({})",
                        toggle.index, toggle.algorithm_name, toggle.time_label
                    );
                }
            }
            UiUpdate::Cleared => {
                self.last_clock = None;
                info!("Display cleared");
            }
        }
    }

    pub fn last_clock(&self) -> Option<&str> {
        self.last_clock.as_deref()
    }
}

impl UiSink for Presenter {
    fn publish(&mut self, update: UiUpdate) {
        self.show(&update);
    }
}
