use crate::pre::race_data::GeoPoint;
use std::cell::RefCell;
use std::rc::Rc;

/// MovableMarker is a marker that was placed on the map. The engine only moves it, its
/// appearance is up to the rendering surface.
pub trait MovableMarker {
    fn set_position(&mut self, point: GeoPoint);
}

/// PathOverlay is a drawn line that can be taken off the map again.
pub trait PathOverlay {
    fn remove(self);
}

/// * `color` - CSS color token of the line
/// * `weight` - (px) Line width
/// * `opacity` - Line opacity in [0, 1]
/// * `tooltip` - Text shown when hovering the line
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
    pub tooltip: String,
}

impl PathStyle {
    pub fn analysis(color: &str, tooltip: String) -> PathStyle {
        PathStyle {
            color: color.to_owned(),
            weight: 3.0,
            opacity: 0.8,
            tooltip,
        }
    }
}

/// RenderSurface is the map the race is drawn on.
pub trait RenderSurface {
    type Marker: MovableMarker;
    type Overlay: PathOverlay;

    fn create_marker(&mut self, at: GeoPoint, color: &str) -> Self::Marker;
    fn draw_path(&mut self, points: &[GeoPoint], style: &PathStyle) -> Self::Overlay;
}

// RECORDING SURFACE -------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPath {
    pub points: Vec<GeoPoint>,
    pub style: PathStyle,
    pub removed: bool,
}

#[derive(Debug, Default)]
struct SurfaceLog {
    markers: Vec<(String, Vec<GeoPoint>)>,
    paths: Vec<RecordedPath>,
}

/// RecordingSurface keeps every marker position and drawn path in memory. It is used for
/// headless playback and in tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

#[derive(Debug)]
pub struct RecordedMarker {
    log: Rc<RefCell<SurfaceLog>>,
    idx: usize,
}

#[derive(Debug)]
pub struct RecordedOverlay {
    log: Rc<RefCell<SurfaceLog>>,
    idx: usize,
}

impl MovableMarker for RecordedMarker {
    fn set_position(&mut self, point: GeoPoint) {
        self.log.borrow_mut().markers[self.idx].1.push(point);
    }
}

impl PathOverlay for RecordedOverlay {
    fn remove(self) {
        self.log.borrow_mut().paths[self.idx].removed = true;
    }
}

impl RenderSurface for RecordingSurface {
    type Marker = RecordedMarker;
    type Overlay = RecordedOverlay;

    fn create_marker(&mut self, at: GeoPoint, color: &str) -> RecordedMarker {
        let mut log = self.log.borrow_mut();
        log.markers.push((color.to_owned(), vec![at]));
        RecordedMarker {
            log: Rc::clone(&self.log),
            idx: log.markers.len() - 1,
        }
    }

    fn draw_path(&mut self, points: &[GeoPoint], style: &PathStyle) -> RecordedOverlay {
        let mut log = self.log.borrow_mut();
        log.paths.push(RecordedPath {
            points: points.to_vec(),
            style: style.clone(),
            removed: false,
        });
        RecordedOverlay {
            log: Rc::clone(&self.log),
            idx: log.paths.len() - 1,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> RecordingSurface {
        RecordingSurface::default()
    }

    pub fn marker_count(&self) -> usize {
        self.log.borrow().markers.len()
    }

    pub fn marker_color(&self, idx: usize) -> Option<String> {
        self.log.borrow().markers.get(idx).map(|m| m.0.to_owned())
    }

    /// marker_positions returns every position the marker had, starting with the one it was
    /// created at.
    pub fn marker_positions(&self, idx: usize) -> Vec<GeoPoint> {
        self.log
            .borrow()
            .markers
            .get(idx)
            .map(|m| m.1.to_owned())
            .unwrap_or_default()
    }

    pub fn paths_drawn(&self) -> usize {
        self.log.borrow().paths.len()
    }

    pub fn paths_visible(&self) -> usize {
        self.log.borrow().paths.iter().filter(|p| !p.removed).count()
    }

    pub fn path(&self, idx: usize) -> Option<RecordedPath> {
        self.log.borrow().paths.get(idx).cloned()
    }
}
