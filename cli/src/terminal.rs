use raceplay::interfaces::render::{MovableMarker, PathOverlay, PathStyle, RenderSurface};
use raceplay::pre::race_data::GeoPoint;
use tracing::{info, trace};

/// TerminalSurface stands in for a map widget: markers and paths are reported through the log.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    no_markers: usize,
    no_paths: usize,
}

#[derive(Debug)]
pub struct TerminalMarker {
    id: usize,
    color: String,
    position: GeoPoint,
}

#[derive(Debug)]
pub struct TerminalOverlay {
    id: usize,
    tooltip: String,
}

impl TerminalSurface {
    pub fn new() -> TerminalSurface {
        TerminalSurface::default()
    }
}

impl MovableMarker for TerminalMarker {
    fn set_position(&mut self, point: GeoPoint) {
        self.position = point;
        trace!(
            marker = self.id,
            color = %self.color,
            lat = self.position.lat,
            lng = self.position.lng,
            "Marker moved"
        );
    }
}

impl PathOverlay for TerminalOverlay {
    fn remove(self) {
        info!("Path {} removed ({})", self.id, self.tooltip);
    }
}

impl RenderSurface for TerminalSurface {
    type Marker = TerminalMarker;
    type Overlay = TerminalOverlay;

    fn create_marker(&mut self, at: GeoPoint, color: &str) -> TerminalMarker {
        self.no_markers += 1;
        TerminalMarker {
            id: self.no_markers - 1,
            color: color.to_owned(),
            position: at,
        }
    }

    fn draw_path(&mut self, points: &[GeoPoint], style: &PathStyle) -> TerminalOverlay {
        self.no_paths += 1;
        info!(
            "Path {} shown: {} with {} points in {}",
            self.no_paths - 1,
            style.tooltip,
            points.len(),
            style.color
        );
        TerminalOverlay {
            id: self.no_paths - 1,
            tooltip: style.tooltip.to_owned(),
        }
    }
}
