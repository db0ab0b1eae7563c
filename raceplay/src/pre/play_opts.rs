use crate::pre::race_data::GeoPoint;
use clap::Parser;
use helpers::general::{parse_coordinate_pair, InputValueError};
use std::path::PathBuf;

fn parse_geo_point(s: &str) -> Result<GeoPoint, InputValueError> {
    let (lat, lng) = parse_coordinate_pair(s)?;
    Ok(GeoPoint { lat, lng })
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "raceplay",
    about = "Plays back precomputed drone races with a live leaderboard and commentary"
)]
pub struct PlayOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Play the race in real time instead of as fast as possible
    #[clap(long)]
    pub realtime: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to a recorded race result (JSON response of the computation service)
    #[clap(short, long, conflicts_with = "service-url")]
    pub race_file: Option<PathBuf>,

    /// Set base URL of the computation service, e.g. http://localhost:8080
    #[clap(short, long)]
    pub service_url: Option<String>,

    /// Set path to the track boundary (GeoJSON polygon), required with --service-url
    #[clap(short, long)]
    pub track_file: Option<PathBuf>,

    /// Set start marker as lat,lng
    #[clap(long, value_parser = parse_geo_point)]
    pub start: Option<GeoPoint>,

    /// Set finish marker as lat,lng
    #[clap(long, value_parser = parse_geo_point)]
    pub end: Option<GeoPoint>,

    /// Set path to the playback config file (JSON)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Override the playback speed factor of the config
    #[clap(long)]
    pub speed_factor: Option<f64>,

    /// Show the paths of the given finishers (0-based leaderboard rows) after the race
    #[clap(long, value_delimiter = ',')]
    pub show_paths: Vec<usize>,

    /// Write the final leaderboard to a CSV file
    #[clap(long)]
    pub csv_out: Option<PathBuf>,

    /// Abort the playback if the race runs longer than this many seconds
    #[clap(long)]
    pub max_race_secs: Option<f64>,
}

impl PlayOpts {
    /// markers returns the start and finish markers in placement order.
    pub fn markers(&self) -> Vec<GeoPoint> {
        self.start.iter().chain(self.end.iter()).copied().collect()
    }
}
