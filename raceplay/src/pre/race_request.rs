use crate::error::PrerequisiteError;
use crate::pre::race_data::GeoPoint;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// GeoJsonPolygon is the track boundary as drawn by the user. Rings are stored in GeoJSON order
/// (`[lng, lat]` pairs); the first ring is the outer boundary, further rings are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPolygon {
    #[serde(rename = "type", default = "polygon_type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

fn polygon_type() -> String {
    "Polygon".to_owned()
}

impl GeoJsonPolygon {
    pub fn from_ring(ring: &[GeoPoint]) -> GeoJsonPolygon {
        GeoJsonPolygon {
            kind: polygon_type(),
            coordinates: vec![ring.iter().map(|p| [p.lng, p.lat]).collect()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.iter().all(|ring| ring.is_empty())
    }
}

/// read_track_boundary reads a GeoJSON polygon (e.g. an exported track preset) from a file.
pub fn read_track_boundary(filepath: &Path) -> anyhow::Result<GeoJsonPolygon> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open track file {}!", filepath.display()))?;
    let polygon = serde_json::from_reader(&fh)
        .context(format!("Failed to parse track file {}!", filepath.display()))?;
    Ok(polygon)
}

/// RaceRequest collects what the user has set up on the map so far. Markers are kept in the
/// order they were placed: the first one is the start, the second one the finish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceRequest {
    pub boundary: Option<GeoJsonPolygon>,
    pub markers: Vec<GeoPoint>,
}

/// RacePayload is the body sent to the computation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacePayload {
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    #[serde(rename = "LLMInput")]
    pub llm_input: GeoJsonPolygon,
}

impl RaceRequest {
    pub fn new(boundary: Option<GeoJsonPolygon>, markers: Vec<GeoPoint>) -> RaceRequest {
        RaceRequest { boundary, markers }
    }

    /// validate checks the race prerequisites (a boundary and exactly two markers) and builds the
    /// service payload from them.
    pub fn validate(&self) -> Result<RacePayload, PrerequisiteError> {
        let boundary = match &self.boundary {
            Some(b) if !b.is_empty() => b,
            _ => return Err(PrerequisiteError::MissingBoundary),
        };

        match self.markers.as_slice() {
            [start, end] => Ok(RacePayload {
                start_location: *start,
                end_location: *end,
                llm_input: boundary.clone(),
            }),
            markers => Err(PrerequisiteError::MarkerCount(markers.len())),
        }
    }
}
