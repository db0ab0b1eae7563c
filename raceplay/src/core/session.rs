use crate::core::clock::Clock;
use crate::core::scheduler::{PlaybackEvent, PlaybackScheduler};
use crate::error::{OverlayError, PrepareError};
use crate::interfaces::render::{PathStyle, RenderSurface};
use crate::interfaces::service::ComputationService;
use crate::interfaces::ui_interface::{RaceStatus, UiSink, UiUpdate};
use crate::post::commentary::{CommentaryEntry, CommentaryLog, TimeLabel};
use crate::post::leaderboard::{leaderboard_rows, record_finish, FinishEntry, LeaderboardRow};
use crate::post::overlay_store::{overlay_toggles, OverlayStore};
use crate::post::race_outcome::RaceOutcome;
use crate::pre::playback_config::PlaybackConfig;
use crate::pre::race_data::RaceResult;
use crate::pre::race_request::RaceRequest;
use helpers::general::format_race_time;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Countdown,
    Racing,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Countdown => "counting down",
            SessionState::Racing => "racing",
            SessionState::Finished => "finished",
        };
        write!(f, "{}", s)
    }
}

/// RaceSession is one race attempt, from the countdown to the post-race path analysis.
///
/// The session is a plain owned value. Every operation gets the current time and the rendering
/// surface and UI sink it should talk to, so several sessions (or a replay next to a live race)
/// can exist side by side. All timers live in the session's scheduler; dropping or clearing the
/// session silences them.
pub struct RaceSession<R: RenderSurface> {
    config: PlaybackConfig,
    state: SessionState,
    race: Option<RaceResult>,
    scheduler: PlaybackScheduler<R::Marker>,
    wall_clock_start: Option<Duration>,
    countdown: i64,
    active_count: usize,
    excluded: Vec<usize>,
    finished: Vec<FinishEntry>,
    overlays: OverlayStore<R::Overlay>,
    commentary: CommentaryLog,
}

impl<R: RenderSurface> RaceSession<R> {
    pub fn new(config: PlaybackConfig) -> RaceSession<R> {
        RaceSession {
            config,
            state: SessionState::Idle,
            race: None,
            scheduler: PlaybackScheduler::new(),
            wall_clock_start: None,
            countdown: 0,
            active_count: 0,
            excluded: Vec::new(),
            finished: Vec::new(),
            overlays: OverlayStore::new(),
            commentary: CommentaryLog::new(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // STATE TRANSITIONS ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// request_race validates the map setup, asks the computation service for the competitor
    /// paths and starts the countdown. Incomplete setups are rejected without touching the
    /// session. A failing service leaves the session idle with one commentary entry.
    pub fn request_race<S, C, U>(
        &mut self,
        request: &RaceRequest,
        service: &S,
        clock: &C,
        ui: &mut U,
    ) -> Result<(), PrepareError>
    where
        S: ComputationService + ?Sized,
        C: Clock + ?Sized,
        U: UiSink + ?Sized,
    {
        let payload = request.validate()?;

        self.discard_previous(ui);
        ui.publish(UiUpdate::Status(RaceStatus::Calculating));

        match service.compute(&payload) {
            Ok(race) => {
                self.begin_countdown(race, clock.now(), ui);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Race calculation failed");
                self.log(format!("Calculation failed: {}", e), false, clock.now(), ui);
                ui.publish(UiUpdate::Status(RaceStatus::Error));
                Err(e.into())
            }
        }
    }

    /// begin_countdown takes a validated race result and starts the countdown. Whatever the
    /// session was doing before is discarded first.
    pub fn begin_countdown<U: UiSink + ?Sized>(
        &mut self,
        race: RaceResult,
        now: Duration,
        ui: &mut U,
    ) {
        self.discard_previous(ui);

        info!(
            race_id = race.race_id.as_deref().unwrap_or("-"),
            competitors = race.competitors.len(),
            "Countdown started"
        );
        self.race = Some(race);
        self.state = SessionState::Countdown;
        self.countdown = i64::from(self.config.countdown_from);

        ui.publish(UiUpdate::Status(RaceStatus::Countdown));
        ui.publish(UiUpdate::Countdown(Some(countdown_label(self.countdown))));
        self.scheduler
            .start_countdown(now, self.config.countdown_interval());
    }

    /// advance handles every timer that is due at `now`, in order.
    pub fn advance<U: UiSink + ?Sized>(
        &mut self,
        now: Duration,
        surface: &mut R,
        ui: &mut U,
    ) -> usize {
        let mut handled = 0;
        while let Some(event) = self.scheduler.next_event(now) {
            handled += 1;
            match event {
                PlaybackEvent::CountdownTick => self.countdown_tick(now, surface, ui),
                PlaybackEvent::ClockTick => {
                    ui.publish(UiUpdate::Clock(self.elapsed_label(now)));
                }
                PlaybackEvent::Finish { lane } => self.finish(lane, now, ui),
            }
        }
        handled
    }

    /// set_path_visible shows or hides the flown path of a finisher. `index` is the row of the
    /// finisher in the final classification. Both directions are idempotent.
    pub fn set_path_visible(
        &mut self,
        index: usize,
        visible: bool,
        surface: &mut R,
    ) -> Result<bool, OverlayError> {
        if self.state != SessionState::Finished {
            return Err(OverlayError::Unavailable(self.state));
        }
        let entry = self
            .finished
            .get(index)
            .ok_or(OverlayError::UnknownFinisher {
                index,
                finishers: self.finished.len(),
            })?;

        if !visible {
            let removed = self.overlays.hide(index);
            debug!(index, removed, "Path overlay hidden");
            return Ok(removed);
        }

        let points = self
            .race
            .as_ref()
            .and_then(|race| race.competitors.get(entry.competitor))
            .map(|c| c.points())
            .unwrap_or_default();
        let style = PathStyle::analysis(
            &entry.color,
            format!("{} ({})", entry.algorithm_name, entry.time_label),
        );
        let created = self
            .overlays
            .show_with(index, || surface.draw_path(&points, &style));
        debug!(index, created, "Path overlay shown");
        Ok(created)
    }

    /// clear resets the session to idle: all timers are cancelled, overlays removed and the
    /// leaderboard and commentary feed emptied.
    pub fn clear<U: UiSink + ?Sized>(&mut self, now: Duration, ui: &mut U) {
        self.teardown();
        self.commentary.clear();

        ui.publish(UiUpdate::Cleared);
        ui.publish(UiUpdate::Countdown(None));
        ui.publish(UiUpdate::Clock(format_race_time(0)));
        ui.publish(UiUpdate::Status(RaceStatus::Ready));
        self.log("Map cleared.".to_owned(), false, now, ui);
    }

    // ---------------------------------------------------------------------------------------------
    // RACE PARTS ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn countdown_tick<U: UiSink + ?Sized>(&mut self, now: Duration, surface: &mut R, ui: &mut U) {
        self.countdown -= 1;
        if self.countdown >= 0 {
            ui.publish(UiUpdate::Countdown(Some(countdown_label(self.countdown))));
        } else {
            self.start_racing(now, surface, ui);
        }
    }

    fn start_racing<U: UiSink + ?Sized>(&mut self, now: Duration, surface: &mut R, ui: &mut U) {
        self.scheduler.stop_countdown();
        ui.publish(UiUpdate::Countdown(None));

        self.state = SessionState::Racing;
        self.wall_clock_start = Some(now);
        self.finished.clear();
        ui.publish(UiUpdate::Status(RaceStatus::Racing));
        ui.publish(UiUpdate::Leaderboard(Vec::new()));
        ui.publish(UiUpdate::Clock(format_race_time(0)));
        self.log("Lights out and away we go!".to_owned(), true, now, ui);

        let race = match &self.race {
            Some(race) => race,
            None => return,
        };
        let launch = self.scheduler.launch(race, &self.config, now, surface);
        self.active_count = launch.scheduled;
        self.excluded = launch.excluded;
        info!(
            starters = self.active_count,
            excluded = self.excluded.len(),
            "Race started"
        );

        if self.active_count == 0 {
            self.complete_race(now, ui);
        }
    }

    fn finish<U: UiSink + ?Sized>(&mut self, lane: usize, now: Duration, ui: &mut U) {
        let competitor = match self.scheduler.lane(lane) {
            Some(l) => l.competitor(),
            None => return,
        };
        let result = match self.race.as_ref().and_then(|r| r.competitors.get(competitor)) {
            Some(result) => result,
            None => return,
        };

        self.active_count = self.active_count.saturating_sub(1);
        let entry = FinishEntry::new(
            competitor,
            &result.algorithm_name,
            &result.color,
            self.elapsed(now),
        );
        let text = format!("{} finishes in {}", entry.algorithm_name, entry.time_label);
        let rank = record_finish(&mut self.finished, entry);
        info!(%text, rank, remaining = self.active_count, "Competitor finished");

        ui.publish(UiUpdate::Leaderboard(leaderboard_rows(&self.finished)));
        self.log(text, true, now, ui);

        if self.active_count == 0 {
            self.complete_race(now, ui);
        }
    }

    fn complete_race<U: UiSink + ?Sized>(&mut self, now: Duration, ui: &mut U) {
        self.scheduler.stop_clock();
        self.state = SessionState::Finished;
        ui.publish(UiUpdate::Clock(self.elapsed_label(now)));
        ui.publish(UiUpdate::Status(RaceStatus::Finished));
        self.log("Race complete.".to_owned(), true, now, ui);
        ui.publish(UiUpdate::AnalysisAvailable(overlay_toggles(&self.finished)));
        info!(finishers = self.finished.len(), "Race complete");
    }

    /// discard_previous tears down a race that is still counting down, racing or finished and
    /// empties the leaderboard and analysis widgets that were showing it.
    fn discard_previous<U: UiSink + ?Sized>(&mut self, ui: &mut U) {
        if self.state == SessionState::Idle {
            return;
        }
        debug!(state = %self.state, "Discarding previous race");
        self.teardown();
        ui.publish(UiUpdate::Leaderboard(Vec::new()));
        ui.publish(UiUpdate::AnalysisAvailable(Vec::new()));
    }

    /// teardown cancels every timer and drops the race specific state. The commentary feed is
    /// kept.
    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.overlays.clear();
        self.finished.clear();
        self.excluded.clear();
        self.active_count = 0;
        self.countdown = 0;
        self.wall_clock_start = None;
        self.race = None;
        self.state = SessionState::Idle;
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn log<U: UiSink + ?Sized>(&mut self, text: String, highlight: bool, now: Duration, ui: &mut U) {
        let time_label = match self.wall_clock_start {
            Some(_) => TimeLabel::Elapsed(self.elapsed_label(now)),
            None => TimeLabel::PreRace,
        };
        let entry = CommentaryEntry {
            time_label,
            text,
            highlight,
        };
        self.commentary.push(entry.clone());
        ui.publish(UiUpdate::Commentary(entry));
    }

    fn elapsed(&self, now: Duration) -> Duration {
        self.wall_clock_start
            .map_or(Duration::ZERO, |start| now.saturating_sub(start))
    }

    fn elapsed_label(&self, now: Duration) -> String {
        format_race_time(self.elapsed(now).as_millis() as u64)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn race(&self) -> Option<&RaceResult> {
        self.race.as_ref()
    }

    pub fn wall_clock_start(&self) -> Option<Duration> {
        self.wall_clock_start
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    pub fn finished(&self) -> &[FinishEntry] {
        &self.finished
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        leaderboard_rows(&self.finished)
    }

    pub fn commentary(&self) -> &CommentaryLog {
        &self.commentary
    }

    pub fn overlays(&self) -> &OverlayStore<R::Overlay> {
        &self.overlays
    }

    pub fn scheduler(&self) -> &PlaybackScheduler<R::Marker> {
        &self.scheduler
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// outcome returns the final classification once the race is finished.
    pub fn outcome(&self) -> Option<RaceOutcome> {
        if self.state != SessionState::Finished {
            return None;
        }
        let race = self.race.as_ref()?;
        Some(RaceOutcome::from_finishers(
            race,
            &self.finished,
            &self.excluded,
            self.config.default_travel_time_s,
        ))
    }
}

fn countdown_label(count: i64) -> String {
    if count > 0 {
        count.to_string()
    } else {
        "GO".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::VirtualClock;
    use crate::error::{PrerequisiteError, ServiceError};
    use crate::interfaces::render::RecordingSurface;
    use crate::pre::race_data::{CompetitorResult, GeoPoint, LineString};
    use crate::pre::race_request::{GeoJsonPolygon, RacePayload};

    type Session = RaceSession<RecordingSurface>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn competitor(name: &str, color: &str, points: usize, travel_time: f64) -> CompetitorResult {
        let path: Vec<GeoPoint> = (0..points)
            .map(|i| GeoPoint::new(55.944 + i as f64 * 0.0005, -3.188))
            .collect();
        CompetitorResult {
            algorithm_name: name.to_owned(),
            color: color.to_owned(),
            path: if points == 0 {
                None
            } else {
                Some(LineString::from_points(&path))
            },
            travel_time: Some(travel_time),
            move_count: None,
            computation_time_ms: None,
        }
    }

    fn race(competitors: Vec<CompetitorResult>) -> RaceResult {
        RaceResult {
            race_id: Some("test".to_owned()),
            start_location: GeoPoint::new(55.944, -3.188),
            end_location: GeoPoint::new(55.946, -3.188),
            track_obstacles: None,
            competitors,
        }
    }

    fn fast_and_slow() -> RaceResult {
        race(vec![
            competitor("Slow", "#222", 5, 80.0),
            competitor("Fast", "#111", 5, 20.0),
        ])
    }

    fn run_to_finish(
        session: &mut Session,
        surface: &mut RecordingSurface,
        ui: &mut Vec<UiUpdate>,
        clock: &VirtualClock,
    ) {
        while !session.is_finished() {
            let due = session.next_due().expect("race stalled");
            clock.wait_until(due);
            session.advance(clock.now(), surface, ui);
        }
    }

    fn finished_session() -> (Session, RecordingSurface, Vec<UiUpdate>, VirtualClock) {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();
        let clock = VirtualClock::new();
        session.begin_countdown(fast_and_slow(), clock.now(), &mut ui);
        run_to_finish(&mut session, &mut surface, &mut ui, &clock);
        (session, surface, ui, clock)
    }

    struct FixedService(RaceResult);

    impl ComputationService for FixedService {
        fn compute(&self, _payload: &RacePayload) -> Result<RaceResult, ServiceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingService;

    impl ComputationService for FailingService {
        fn compute(&self, _payload: &RacePayload) -> Result<RaceResult, ServiceError> {
            Err(ServiceError::Status(500))
        }
    }

    fn valid_request() -> RaceRequest {
        RaceRequest::new(
            Some(GeoJsonPolygon::from_ring(&[
                GeoPoint::new(55.94, -3.19),
                GeoPoint::new(55.95, -3.19),
                GeoPoint::new(55.95, -3.18),
                GeoPoint::new(55.94, -3.19),
            ])),
            vec![GeoPoint::new(55.944, -3.188), GeoPoint::new(55.946, -3.188)],
        )
    }

    #[test]
    fn countdown_counts_to_go_then_races() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();

        session.begin_countdown(fast_and_slow(), ms(0), &mut ui);
        assert_eq!(session.state(), SessionState::Countdown);

        for t in [1000, 2000, 3000] {
            session.advance(ms(t), &mut surface, &mut ui);
            assert_eq!(session.state(), SessionState::Countdown);
        }
        let labels: Vec<String> = ui
            .iter()
            .filter_map(|u| match u {
                UiUpdate::Countdown(Some(l)) => Some(l.to_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["3", "2", "1", "GO"]);
        assert_eq!(surface.marker_count(), 0);

        session.advance(ms(4000), &mut surface, &mut ui);
        assert_eq!(session.state(), SessionState::Racing);
        assert_eq!(session.wall_clock_start(), Some(ms(4000)));
        assert_eq!(session.active_count(), 2);
        assert_eq!(surface.marker_count(), 2);
        assert!(ui.contains(&UiUpdate::Countdown(None)));

        let start = session.commentary().latest().unwrap();
        assert_eq!(start.text, "Lights out and away we go!");
        assert!(start.highlight);
        assert_eq!(start.time_label, TimeLabel::Elapsed("00:00.00".to_owned()));
    }

    #[test]
    fn fast_finishes_before_slow() {
        let (session, _surface, ui, _clock) = finished_session();

        let finished = session.finished();
        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0].algorithm_name, "Fast");
        assert_eq!(finished[0].elapsed_ms, 1200);
        assert_eq!(finished[1].algorithm_name, "Slow");
        assert_eq!(finished[1].elapsed_ms, 4800);

        // the first leaderboard published already has Fast on top
        let first_board = ui
            .iter()
            .find_map(|u| match u {
                UiUpdate::Leaderboard(rows) if !rows.is_empty() => Some(rows.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_board.len(), 1);
        assert_eq!(first_board[0].algorithm_name, "Fast");

        let board = session.leaderboard();
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].rank, board[0].algorithm_name.as_str()), (1, "Fast"));
        assert_eq!((board[1].rank, board[1].algorithm_name.as_str()), (2, "Slow"));

        assert_eq!(session.active_count(), 0);
        assert!(!session.scheduler().clock_running());
        assert_eq!(session.commentary().latest().unwrap().text, "Race complete.");
        assert!(matches!(
            ui.last(),
            Some(UiUpdate::AnalysisAvailable(toggles)) if toggles.len() == 2
        ));
    }

    #[test]
    fn finish_commentary_carries_elapsed_time() {
        let (session, _surface, _ui, _clock) = finished_session();

        let fast = session
            .commentary()
            .entries()
            .find(|e| e.text.starts_with("Fast"))
            .unwrap();
        assert_eq!(fast.text, "Fast finishes in 00:01.20");
        assert_eq!(fast.time_label, TimeLabel::Elapsed("00:01.20".to_owned()));
        assert!(fast.highlight);
    }

    #[test]
    fn empty_path_is_excluded_without_blocking_the_finish() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();
        let clock = VirtualClock::new();

        session.begin_countdown(
            race(vec![
                competitor("Ghost", "#333", 0, 10.0),
                competitor("Runner", "#444", 3, 50.0),
            ]),
            clock.now(),
            &mut ui,
        );

        while !session.is_finished() {
            clock.wait_until(session.next_due().unwrap());
            session.advance(clock.now(), &mut surface, &mut ui);
            if session.state() == SessionState::Racing {
                assert_eq!(
                    session.active_count() + session.finished().len() + session.excluded_count(),
                    2
                );
            }
        }

        assert_eq!(session.excluded_count(), 1);
        assert_eq!(session.finished().len(), 1);
        assert_eq!(session.finished()[0].algorithm_name, "Runner");
        assert_eq!(surface.marker_count(), 1);
        assert_eq!(session.outcome().unwrap().excluded, vec!["Ghost".to_owned()]);
    }

    #[test]
    fn race_without_starters_completes_immediately() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();

        session.begin_countdown(
            race(vec![competitor("Ghost", "#333", 0, 10.0)]),
            ms(0),
            &mut ui,
        );
        for t in [1000, 2000, 3000, 4000] {
            session.advance(ms(t), &mut surface, &mut ui);
        }

        assert!(session.is_finished());
        assert!(session.leaderboard().is_empty());
        assert_eq!(session.next_due(), None);
        assert_eq!(ui.last(), Some(&UiUpdate::AnalysisAvailable(Vec::new())));
    }

    #[test]
    fn overlays_wait_for_the_finish() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();

        assert_eq!(
            session.set_path_visible(0, true, &mut surface),
            Err(OverlayError::Unavailable(SessionState::Idle))
        );
        session.begin_countdown(fast_and_slow(), ms(0), &mut ui);
        assert_eq!(
            session.set_path_visible(0, true, &mut surface),
            Err(OverlayError::Unavailable(SessionState::Countdown))
        );
        assert_eq!(surface.paths_drawn(), 0);
    }

    #[test]
    fn overlay_toggles_are_idempotent() {
        let (mut session, mut surface, _ui, _clock) = finished_session();

        assert_eq!(session.set_path_visible(0, true, &mut surface), Ok(true));
        assert_eq!(session.set_path_visible(0, true, &mut surface), Ok(false));
        assert_eq!(session.overlays().len(), 1);
        assert_eq!(surface.paths_drawn(), 1);

        let drawn = surface.path(0).unwrap();
        assert_eq!(drawn.style.color, "#111");
        assert_eq!(drawn.style.tooltip, "Fast (00:01.20)");
        assert_eq!(drawn.points.len(), 5);

        assert_eq!(session.set_path_visible(0, false, &mut surface), Ok(true));
        assert_eq!(session.set_path_visible(0, false, &mut surface), Ok(false));
        assert!(session.overlays().is_empty());
        assert_eq!(surface.paths_visible(), 0);

        assert_eq!(
            session.set_path_visible(2, true, &mut surface),
            Err(OverlayError::UnknownFinisher {
                index: 2,
                finishers: 2
            })
        );
    }

    #[test]
    fn clear_resets_everything_and_silences_timers() {
        let (mut session, mut surface, mut ui, clock) = finished_session();
        session.set_path_visible(1, true, &mut surface).unwrap();

        session.clear(clock.now(), &mut ui);

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.finished().is_empty());
        assert!(session.overlays().is_empty());
        assert_eq!(session.active_count(), 0);
        assert_eq!(session.wall_clock_start(), None);
        assert_eq!(surface.paths_visible(), 0);
        assert_eq!(session.commentary().len(), 1);
        let cleared = session.commentary().latest().unwrap();
        assert_eq!(cleared.text, "Map cleared.");
        assert_eq!(cleared.time_label, TimeLabel::PreRace);

        let published = ui.len();
        clock.advance_by(Duration::from_secs(3600));
        assert_eq!(session.advance(clock.now(), &mut surface, &mut ui), 0);
        assert_eq!(ui.len(), published);
    }

    #[test]
    fn clear_during_race_stops_markers() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut surface = RecordingSurface::new();
        let mut ui = Vec::new();

        session.begin_countdown(fast_and_slow(), ms(0), &mut ui);
        session.advance(ms(4000), &mut surface, &mut ui);
        session.advance(ms(4400), &mut surface, &mut ui);
        let moved: Vec<usize> = (0..2).map(|i| surface.marker_positions(i).len()).collect();

        session.clear(ms(4400), &mut ui);
        assert_eq!(session.next_due(), None);
        assert_eq!(session.advance(ms(60_000), &mut surface, &mut ui), 0);

        let after: Vec<usize> = (0..2).map(|i| surface.marker_positions(i).len()).collect();
        assert_eq!(moved, after);
        assert!(session.finished().is_empty());
    }

    #[test]
    fn incomplete_setup_does_not_leave_idle() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut ui = Vec::new();
        let clock = VirtualClock::new();
        let request = RaceRequest::new(None, vec![GeoPoint::new(0.0, 0.0)]);

        let err = session
            .request_race(&request, &FixedService(fast_and_slow()), &clock, &mut ui)
            .unwrap_err();

        assert!(matches!(
            err,
            PrepareError::Prerequisites(PrerequisiteError::MissingBoundary)
        ));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(ui.is_empty());
        assert!(session.commentary().is_empty());
    }

    #[test]
    fn service_failure_is_logged_once() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut ui = Vec::new();
        let clock = VirtualClock::new();

        let err = session
            .request_race(&valid_request(), &FailingService, &clock, &mut ui)
            .unwrap_err();

        assert!(matches!(err, PrepareError::Service(ServiceError::Status(500))));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.race().is_none());
        assert_eq!(session.commentary().len(), 1);
        let entry = session.commentary().latest().unwrap();
        assert!(entry.text.starts_with("Calculation failed: "));
        assert_eq!(entry.time_label, TimeLabel::PreRace);
        assert_eq!(ui.last(), Some(&UiUpdate::Status(RaceStatus::Error)));
    }

    #[test]
    fn successful_request_starts_the_countdown() {
        let mut session = Session::new(PlaybackConfig::default());
        let mut ui = Vec::new();
        let clock = VirtualClock::new();

        session
            .request_race(&valid_request(), &FixedService(fast_and_slow()), &clock, &mut ui)
            .unwrap();

        assert_eq!(session.state(), SessionState::Countdown);
        assert_eq!(ui[0], UiUpdate::Status(RaceStatus::Calculating));
        assert_eq!(session.next_due(), Some(ms(1000)));
    }

    #[test]
    fn failed_request_after_a_race_empties_the_leaderboard() {
        let (mut session, _surface, mut ui, clock) = finished_session();
        let published = ui.len();

        session
            .request_race(&valid_request(), &FailingService, &clock, &mut ui)
            .unwrap_err();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.leaderboard().is_empty());
        let updates = &ui[published..];
        assert_eq!(updates[0], UiUpdate::Leaderboard(Vec::new()));
        assert_eq!(updates[1], UiUpdate::AnalysisAvailable(Vec::new()));
        assert_eq!(updates[2], UiUpdate::Status(RaceStatus::Calculating));
        assert_eq!(updates.last(), Some(&UiUpdate::Status(RaceStatus::Error)));
    }

    #[test]
    fn new_race_discards_previous_session() {
        let (mut session, mut surface, mut ui, clock) = finished_session();
        session.set_path_visible(0, true, &mut surface).unwrap();

        session.begin_countdown(fast_and_slow(), clock.now(), &mut ui);

        assert_eq!(session.state(), SessionState::Countdown);
        assert!(session.finished().is_empty());
        assert!(session.overlays().is_empty());
        assert_eq!(surface.paths_visible(), 0);
        assert!(session.outcome().is_none());
        assert!(ui.contains(&UiUpdate::AnalysisAvailable(Vec::new())));
        // the feed survives a restart, only clear empties it
        assert!(session.commentary().len() > 1);
    }
}
