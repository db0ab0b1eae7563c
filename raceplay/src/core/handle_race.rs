use crate::core::clock::Clock;
use crate::core::session::RaceSession;
use crate::interfaces::render::RenderSurface;
use crate::interfaces::ui_interface::UiSink;
use crate::post::race_outcome::RaceOutcome;
use crate::pre::race_data::RaceResult;
use anyhow::Context;
use std::time::Duration;
use tracing::{debug, info};

/// handle_race starts the countdown for the inserted race and plays it back until every
/// competitor has finished. The results are returned for post-processing.
///
/// With a `VirtualClock` the playback runs as fast as the machine allows, with a `WallClock` it
/// runs in real time.
pub fn handle_race<R, C, U>(
    session: &mut RaceSession<R>,
    race: RaceResult,
    clock: &C,
    surface: &mut R,
    ui: &mut U,
    max_duration: Option<Duration>,
) -> anyhow::Result<RaceOutcome>
where
    R: RenderSurface,
    C: Clock + ?Sized,
    U: UiSink + ?Sized,
{
    session.begin_countdown(race, clock.now(), ui);
    run_to_finish(session, clock, surface, ui, max_duration)
}

/// run_to_finish drives an already started session (countdown or racing) until it reaches the
/// finished state. `max_duration` limits the racing phase, the countdown is not counted.
pub fn run_to_finish<R, C, U>(
    session: &mut RaceSession<R>,
    clock: &C,
    surface: &mut R,
    ui: &mut U,
    max_duration: Option<Duration>,
) -> anyhow::Result<RaceOutcome>
where
    R: RenderSurface,
    C: Clock + ?Sized,
    U: UiSink + ?Sized,
{
    let mut t_progress_print = Duration::ZERO;

    while !session.is_finished() {
        let due = session.next_due().with_context(|| {
            format!(
                "Playback stalled while {} (no timer left to fire)!",
                session.state()
            )
        })?;

        if let (Some(limit), Some(start)) = (max_duration, session.wall_clock_start()) {
            if due.saturating_sub(start) > limit {
                anyhow::bail!(
                    "Race did not finish within {:.1}s, {} competitor(s) still flying!",
                    limit.as_secs_f64(),
                    session.active_count()
                );
            }
        }

        clock.wait_until(due);
        let now = clock.now();
        session.advance(now, surface, ui);

        if let Some(start) = session.wall_clock_start() {
            let elapsed = now.saturating_sub(start);
            if elapsed >= t_progress_print + Duration::from_secs(1) {
                debug!(
                    elapsed_s = elapsed.as_secs_f64(),
                    flying = session.active_count(),
                    finished = session.finished().len(),
                    "Playing back..."
                );
                t_progress_print = elapsed;
            }
        }
    }

    let outcome = session
        .outcome()
        .context("Finished race has no result to report!")?;
    info!(
        finishers = outcome.rows.len(),
        excluded = outcome.excluded.len(),
        "Playback finished"
    );
    Ok(outcome)
}
