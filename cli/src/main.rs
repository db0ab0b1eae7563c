mod http_service;
mod presenter;
mod terminal;

use anyhow::Context;
use clap::Parser;
use http_service::HttpService;
use presenter::Presenter;
use raceplay::core::clock::{Clock, VirtualClock, WallClock};
use raceplay::core::handle_race::run_to_finish;
use raceplay::core::session::RaceSession;
use raceplay::interfaces::ui_interface::{UiSink, UiUpdate};
use raceplay::post::race_outcome::RaceOutcome;
use raceplay::pre::play_opts::PlayOpts;
use raceplay::pre::playback_config::{read_playback_config, PlaybackConfig};
use raceplay::pre::race_data::{read_race_result, RaceResult};
use raceplay::pre::race_request::{read_track_boundary, RaceRequest};
use std::thread;
use std::time::{Duration, Instant};
use terminal::TerminalSurface;
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

type Played = (RaceSession<TerminalSurface>, TerminalSurface, RaceOutcome);

/// RaceSource is where the competitor paths come from.
enum RaceSource {
    Recorded(RaceResult),
    Service {
        service: HttpService,
        request: RaceRequest,
    },
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn race_source(opts: &PlayOpts) -> anyhow::Result<RaceSource> {
    if let Some(race_file) = &opts.race_file {
        info!("Reading recorded race result from {}", race_file.display());
        return Ok(RaceSource::Recorded(read_race_result(race_file)?));
    }

    let url = match &opts.service_url {
        Some(url) => url,
        None => anyhow::bail!(
            "No race source provided! Use -r <race.json> or -s <url> -t <track.json> --start <lat,lng> --end <lat,lng>."
        ),
    };
    let boundary = match &opts.track_file {
        Some(track_file) => Some(read_track_boundary(track_file)?),
        None => None,
    };
    Ok(RaceSource::Service {
        service: HttpService::new(url)?,
        request: RaceRequest::new(boundary, opts.markers()),
    })
}

/// start brings a fresh session out of idle, either by requesting the race from the service or
/// by starting the countdown for a recorded result.
fn start<C, U>(
    session: &mut RaceSession<TerminalSurface>,
    source: RaceSource,
    clock: &C,
    ui: &mut U,
) -> anyhow::Result<()>
where
    C: Clock + ?Sized,
    U: UiSink + ?Sized,
{
    match source {
        RaceSource::Recorded(race) => session.begin_countdown(race, clock.now(), ui),
        RaceSource::Service { service, request } => {
            session.request_race(&request, &service, clock, ui)?
        }
    }
    Ok(())
}

fn play_headless(
    config: PlaybackConfig,
    source: RaceSource,
    max_duration: Option<Duration>,
) -> anyhow::Result<Played> {
    let clock = VirtualClock::new();
    let mut session = RaceSession::new(config);
    let mut surface = TerminalSurface::new();
    let mut presenter = Presenter::new();

    start(&mut session, source, &clock, &mut presenter)?;
    let outcome = run_to_finish(
        &mut session,
        &clock,
        &mut surface,
        &mut presenter,
        max_duration,
    )?;
    if let Some(label) = presenter.last_clock() {
        info!("Race clock stopped at {}", label);
    }
    Ok((session, surface, outcome))
}

fn play_realtime(
    config: PlaybackConfig,
    source: RaceSource,
    max_duration: Option<Duration>,
) -> anyhow::Result<Played> {
    // create channel for communication between playback thread and presenter
    let (mut tx, rx) = flume::unbounded::<UiUpdate>();

    // the playback runs in its own thread, the presenter stays on the main thread
    let playback = thread::spawn(move || -> anyhow::Result<Played> {
        let clock = WallClock::new();
        let mut session = RaceSession::new(config);
        let mut surface = TerminalSurface::new();

        start(&mut session, source, &clock, &mut tx)?;
        let outcome = run_to_finish(&mut session, &clock, &mut surface, &mut tx, max_duration)?;
        Ok((session, surface, outcome))
    });

    // the receiver iterator ends as soon as the playback thread drops its sender
    let mut presenter = Presenter::new();
    for update in rx.iter() {
        presenter.show(&update);
    }

    playback
        .join()
        .map_err(|_| anyhow::anyhow!("Playback thread panicked!"))?
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get playback options from the command line arguments
    let opts: PlayOpts = PlayOpts::parse();
    init_logging(opts.debug);

    // get playback config
    let mut config = match &opts.config {
        Some(config_path) => {
            info!("Reading playback config from {}", config_path.display());
            read_playback_config(config_path)?
        }
        None => PlaybackConfig::default(),
    };
    if let Some(speed_factor) = opts.speed_factor {
        config.speed_factor = speed_factor;
    }
    config.validate()?;

    let max_duration = match opts.max_race_secs {
        Some(secs) => Some(
            Duration::try_from_secs_f64(secs)
                .context(format!("Invalid maximum race duration {}s!", secs))?,
        ),
        None => None,
    };

    let source = race_source(&opts)?;

    // EXECUTION -----------------------------------------------------------------------------------
    info!(
        "Playing back race with speed factor {:.1}{}",
        config.speed_factor,
        if opts.realtime { " in real time" } else { "" }
    );
    let t_start = Instant::now();

    let (mut session, mut surface, outcome) = if opts.realtime {
        play_realtime(config, source, max_duration)?
    } else {
        play_headless(config, source, max_duration)?
    };

    info!("Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    for &idx in opts.show_paths.iter() {
        if let Err(e) = session.set_path_visible(idx, true, &mut surface) {
            warn!("Cannot show path {}: {}", idx, e);
        }
    }

    outcome.print_leaderboard();

    if let Some(csv_path) = &opts.csv_out {
        outcome.write_csv(csv_path)?;
        info!("Leaderboard written to {}", csv_path.display());
    }

    Ok(())
}
