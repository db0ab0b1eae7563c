use crate::interfaces::render::PathOverlay;
use crate::interfaces::ui_interface::RgbColor;
use crate::post::leaderboard::FinishEntry;
use std::collections::BTreeMap;

/// OverlayToggle is one row of the post-race path analysis list.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayToggle {
    pub index: usize,
    pub algorithm_name: String,
    pub color: RgbColor,
    pub time_label: String,
}

pub fn overlay_toggles(finished: &[FinishEntry]) -> Vec<OverlayToggle> {
    finished
        .iter()
        .enumerate()
        .map(|(index, e)| OverlayToggle {
            index,
            algorithm_name: e.algorithm_name.to_owned(),
            color: RgbColor::parse_or_grey(&e.color),
            time_label: e.time_label.to_owned(),
        })
        .collect()
}

/// OverlayStore holds the path overlays that are currently shown, keyed by finisher index.
#[derive(Debug)]
pub struct OverlayStore<O: PathOverlay> {
    overlays: BTreeMap<usize, O>,
}

impl<O: PathOverlay> Default for OverlayStore<O> {
    fn default() -> Self {
        OverlayStore {
            overlays: BTreeMap::new(),
        }
    }
}

impl<O: PathOverlay> OverlayStore<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// show_with stores the overlay created by `create` unless one is already shown for the
    /// index, in which case `create` is not called. Returns whether an overlay was created.
    pub fn show_with<F: FnOnce() -> O>(&mut self, index: usize, create: F) -> bool {
        if self.overlays.contains_key(&index) {
            return false;
        }
        self.overlays.insert(index, create());
        true
    }

    /// hide removes the overlay for the index. Returns whether there was one.
    pub fn hide(&mut self, index: usize) -> bool {
        match self.overlays.remove(&index) {
            Some(overlay) => {
                overlay.remove();
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.overlays.contains_key(&index)
    }

    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        self.overlays.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn clear(&mut self) {
        for (_, overlay) in std::mem::take(&mut self.overlays) {
            overlay.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingOverlay {
        removed: Rc<Cell<usize>>,
    }

    impl PathOverlay for CountingOverlay {
        fn remove(self) {
            self.removed.set(self.removed.get() + 1);
        }
    }

    #[test]
    fn showing_twice_creates_one_overlay() {
        let removed = Rc::new(Cell::new(0));
        let mut created = 0;
        let mut store = OverlayStore::new();

        for _ in 0..2 {
            store.show_with(1, || {
                created += 1;
                CountingOverlay {
                    removed: Rc::clone(&removed),
                }
            });
        }

        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_visible(1));
    }

    #[test]
    fn hiding_twice_is_harmless() {
        let removed = Rc::new(Cell::new(0));
        let mut store = OverlayStore::new();
        store.show_with(0, || CountingOverlay {
            removed: Rc::clone(&removed),
        });

        assert!(store.hide(0));
        assert!(!store.hide(0));
        assert!(!store.hide(7));
        assert!(store.is_empty());
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn clear_removes_every_overlay() {
        let removed = Rc::new(Cell::new(0));
        let mut store = OverlayStore::new();
        for i in 0..3 {
            store.show_with(i, || CountingOverlay {
                removed: Rc::clone(&removed),
            });
        }

        store.clear();
        assert!(store.is_empty());
        assert_eq!(removed.get(), 3);
    }
}
