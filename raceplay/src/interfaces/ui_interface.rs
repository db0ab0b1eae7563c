use crate::post::commentary::CommentaryEntry;
use crate::post::leaderboard::LeaderboardRow;
use crate::post::overlay_store::OverlayToggle;
use flume::Sender;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const GREY: RgbColor = RgbColor {
        r: 0x99,
        g: 0x99,
        b: 0x99,
    };

    pub fn parse(token: &str) -> Option<RgbColor> {
        token
            .parse::<css_color_parser::Color>()
            .ok()
            .map(|c| RgbColor {
                r: c.r,
                g: c.g,
                b: c.b,
            })
    }

    /// parse_or_grey parses a CSS color token and falls back to grey for tokens the UI cannot
    /// display.
    pub fn parse_or_grey(token: &str) -> RgbColor {
        RgbColor::parse(token).unwrap_or_else(|| {
            warn!(token, "Could not parse color token, using grey");
            RgbColor::GREY
        })
    }
}

/// RaceStatus is the status indicator shown next to the race timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RaceStatus {
    Ready,
    Calculating,
    Countdown,
    Racing,
    Finished,
    Error,
}

impl RaceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RaceStatus::Ready => "Ready",
            RaceStatus::Calculating => "Calculating...",
            RaceStatus::Countdown => "Get ready...",
            RaceStatus::Racing => "Racing...",
            RaceStatus::Finished => "Finished",
            RaceStatus::Error => "Error",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RaceStatus::Ready => "#ccc",
            RaceStatus::Calculating | RaceStatus::Countdown => "#E0AC00",
            RaceStatus::Racing => "#27AE60",
            RaceStatus::Finished => "#37352F",
            RaceStatus::Error => "#EB5757",
        }
    }
}

/// UiUpdate is a single change of the visible race state. The engine publishes one update per
/// change; sinks re-render the affected widget from it.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Status(RaceStatus),
    // None hides the countdown overlay
    Countdown(Option<String>),
    Clock(String),
    Commentary(CommentaryEntry),
    Leaderboard(Vec<LeaderboardRow>),
    AnalysisAvailable(Vec<OverlayToggle>),
    Cleared,
}

pub trait UiSink {
    fn publish(&mut self, update: UiUpdate);
}

impl UiSink for Vec<UiUpdate> {
    fn publish(&mut self, update: UiUpdate) {
        self.push(update);
    }
}

impl UiSink for Sender<UiUpdate> {
    fn publish(&mut self, update: UiUpdate) {
        if self.send(update).is_err() {
            warn!("UI receiver disconnected, dropping update");
        }
    }
}
