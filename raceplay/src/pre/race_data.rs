use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// GeoPoint is a geographic point in degrees, serialized as `{"lat": .., "lng": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }
}

/// LineString is a GeoJSON line string. Coordinates are stored in GeoJSON order, i.e. as
/// `[lng, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type", default = "line_string_type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

fn line_string_type() -> String {
    "LineString".to_owned()
}

impl LineString {
    pub fn from_points(points: &[GeoPoint]) -> LineString {
        LineString {
            kind: line_string_type(),
            coordinates: points.iter().map(|p| [p.lng, p.lat]).collect(),
        }
    }

    /// points converts the GeoJSON coordinates into geographic points.
    pub fn points(&self) -> Vec<GeoPoint> {
        self.coordinates
            .iter()
            .map(|&[lng, lat]| GeoPoint { lat, lng })
            .collect()
    }
}

/// * `algorithm_name` - Display label of the competitor, e.g. "Optimal Ace (A*)"
/// * `color` - CSS color token used for the marker and the path overlay
/// * `path` - Route from start (first point) to finish (last point), absent means empty
/// * `travel_time` - (s) Simulated time required for the path as reported by the backend
/// * `move_count` - Number of moves the pathfinder needed (informational)
/// * `computation_time_ms` - (ms) Backend computation time (informational)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorResult {
    pub algorithm_name: String,
    pub color: String,
    #[serde(default)]
    pub path: Option<LineString>,
    #[serde(default)]
    pub travel_time: Option<f64>,
    #[serde(default)]
    pub move_count: Option<u32>,
    #[serde(default)]
    pub computation_time_ms: Option<u64>,
}

impl CompetitorResult {
    pub fn points(&self) -> Vec<GeoPoint> {
        self.path.as_ref().map(LineString::points).unwrap_or_default()
    }

    pub fn point_count(&self) -> usize {
        self.path.as_ref().map_or(0, |p| p.coordinates.len())
    }

    /// travel_time_s returns the reported travel time in seconds. Missing, zero and non-finite
    /// values are replaced by the given default. Negative values are kept, the step delay floor
    /// takes care of them.
    pub fn travel_time_s(&self, default_s: f64) -> f64 {
        match self.travel_time {
            Some(t) if t.is_finite() && t != 0.0 => t,
            _ => default_s,
        }
    }
}

/// RaceResult is the response of the computation service. The competitors are kept in the order
/// returned by the backend, which is not the finishing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    #[serde(default)]
    pub race_id: Option<String>,
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    #[serde(default)]
    pub track_obstacles: Option<LineString>,
    #[serde(rename = "droneResults", default)]
    pub competitors: Vec<CompetitorResult>,
}

pub fn parse_race_result(json: &str) -> Result<RaceResult, serde_json::Error> {
    serde_json::from_str(json)
}

/// read_race_result reads a recorded computation service response from a JSON file.
pub fn read_race_result(filepath: &Path) -> anyhow::Result<RaceResult> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open race result file {}!",
            filepath.display()
        ))?;
    let race = serde_json::from_reader(&fh).context(format!(
        "Failed to parse race result file {}!",
        filepath.display()
    ))?;
    Ok(race)
}
