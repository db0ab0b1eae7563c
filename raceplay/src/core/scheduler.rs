use crate::core::timer::{TimerId, TimerQueue};
use crate::interfaces::render::{MovableMarker, RenderSurface};
use crate::pre::playback_config::PlaybackConfig;
use crate::pre::race_data::{GeoPoint, RaceResult};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// step_delay returns the interval between two marker moves of a competitor. The simulated
/// travel time is compressed by `speed_factor` and spread over the points of the path, but never
/// below `min_delay`.
pub fn step_delay(
    travel_time_s: f64,
    point_count: usize,
    speed_factor: f64,
    min_delay: Duration,
) -> Duration {
    let raw_ms = travel_time_s * 1000.0 / speed_factor / point_count.max(1) as f64;
    // float to int casts saturate, NaN and negative values end up at zero
    let delay = Duration::from_nanos((raw_ms * 1_000_000.0).round() as u64);
    delay.max(min_delay)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Countdown,
    RaceClock,
    Lane(usize),
}

/// PlaybackEvent is what the session has to react to. Marker moves are handled inside the
/// scheduler and do not show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    CountdownTick,
    ClockTick,
    Finish { lane: usize },
}

/// Lane is the animation of one competitor.
/// * `competitor` - Index of the competitor in the race result
/// * `cursor` - Index of the next path point the marker moves to
/// * `step_delay` - Interval between two moves
#[derive(Debug)]
pub struct Lane<M> {
    competitor: usize,
    marker: M,
    path: Vec<GeoPoint>,
    cursor: usize,
    step_delay: Duration,
    timer: TimerId,
    finished: bool,
}

impl<M> Lane<M> {
    pub fn competitor(&self) -> usize {
        self.competitor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Launch summarizes which competitors were put on track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub scheduled: usize,
    pub excluded: Vec<usize>,
}

/// PlaybackScheduler owns every timer of a race: the countdown, the race clock and one
/// animation timer per competitor.
#[derive(Debug)]
pub struct PlaybackScheduler<M> {
    timers: TimerQueue<TimerTask>,
    lanes: Vec<Lane<M>>,
    countdown: Option<TimerId>,
    race_clock: Option<TimerId>,
}

impl<M> Default for PlaybackScheduler<M> {
    fn default() -> Self {
        PlaybackScheduler {
            timers: TimerQueue::new(),
            lanes: Vec::new(),
            countdown: None,
            race_clock: None,
        }
    }
}

impl<M: MovableMarker> PlaybackScheduler<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_countdown(&mut self, now: Duration, interval: Duration) {
        self.stop_countdown();
        self.countdown = Some(
            self.timers
                .schedule_repeating(now, interval, TimerTask::Countdown),
        );
    }

    pub fn stop_countdown(&mut self) {
        if let Some(id) = self.countdown.take() {
            self.timers.cancel(id);
        }
    }

    pub fn stop_clock(&mut self) {
        if let Some(id) = self.race_clock.take() {
            self.timers.cancel(id);
        }
    }

    /// launch starts the race clock and one lane per competitor with a non-empty path. Markers
    /// are placed at the start location. Competitors without a path are excluded and reported
    /// back.
    pub fn launch<R: RenderSurface<Marker = M>>(
        &mut self,
        race: &RaceResult,
        config: &PlaybackConfig,
        now: Duration,
        surface: &mut R,
    ) -> Launch {
        self.race_clock = Some(self.timers.schedule_repeating(
            now,
            config.clock_tick(),
            TimerTask::RaceClock,
        ));

        let mut excluded = Vec::new();
        for (competitor, result) in race.competitors.iter().enumerate() {
            let path = result.points();
            if path.is_empty() {
                warn!(
                    competitor = %result.algorithm_name,
                    "Competitor has no path and does not start"
                );
                excluded.push(competitor);
                continue;
            }

            let delay = step_delay(
                result.travel_time_s(config.default_travel_time_s),
                path.len(),
                config.speed_factor,
                config.min_step_delay(),
            );
            let marker = surface.create_marker(race.start_location, &result.color);
            let lane_idx = self.lanes.len();
            let timer = self
                .timers
                .schedule_repeating(now, delay, TimerTask::Lane(lane_idx));

            debug!(
                competitor = %result.algorithm_name,
                points = path.len(),
                step_delay_ms = delay.as_secs_f64() * 1000.0,
                "Lane scheduled"
            );
            self.lanes.push(Lane {
                competitor,
                marker,
                path,
                cursor: 0,
                step_delay: delay,
                timer,
                finished: false,
            });
        }

        Launch {
            scheduled: self.lanes.len(),
            excluded,
        }
    }

    /// next_event processes due timers in order until one of them produces an event for the
    /// session. Lane ticks move their marker; a lane that has passed its last point cancels its
    /// timer and reports its finish exactly once.
    pub fn next_event(&mut self, now: Duration) -> Option<PlaybackEvent> {
        loop {
            let fired = self.timers.pop_due(now)?;
            let lane_idx = match fired.task {
                TimerTask::Countdown => return Some(PlaybackEvent::CountdownTick),
                TimerTask::RaceClock => return Some(PlaybackEvent::ClockTick),
                TimerTask::Lane(idx) => idx,
            };

            let lane = match self.lanes.get_mut(lane_idx) {
                Some(lane) if !lane.finished => lane,
                _ => {
                    self.timers.cancel(fired.id);
                    continue;
                }
            };

            if lane.cursor >= lane.path.len() {
                self.timers.cancel(lane.timer);
                lane.finished = true;
                return Some(PlaybackEvent::Finish { lane: lane_idx });
            }

            let point = lane.path[lane.cursor];
            lane.marker.set_position(point);
            lane.cursor += 1;
            trace!(lane = lane_idx, cursor = lane.cursor, "Marker moved");
        }
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// cancel_all stops every timer and drops all lanes.
    pub fn cancel_all(&mut self) {
        self.timers.cancel_all();
        self.lanes.clear();
        self.countdown = None;
        self.race_clock = None;
    }

    pub fn lane(&self, idx: usize) -> Option<&Lane<M>> {
        self.lanes.get(idx)
    }

    pub fn lanes(&self) -> &[Lane<M>] {
        &self.lanes
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn clock_running(&self) -> bool {
        self.race_clock.is_some()
    }
}
