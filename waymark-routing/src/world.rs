//! The world state one trail build runs against.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use waymark_geometry::{PathGroup, Point};

/// Barriers, shortcut paths and waypoints active for one map.
///
/// Groups are keyed by name in `BTreeMap`s so every walk over them is
/// name-ordered; the builder's output is deterministic for identical input.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub barriers: BTreeMap<String, PathGroup>,
    pub paths: BTreeMap<String, PathGroup>,
    pub waypoints: Vec<Point>,
}

impl World {
    pub fn new(
        barriers: BTreeMap<String, PathGroup>,
        paths: BTreeMap<String, PathGroup>,
        waypoints: Vec<Point>,
    ) -> Self {
        World {
            barriers,
            paths,
            waypoints,
        }
    }

    /// Merge additional shortcut groups (point-to-point edge blocks) into the
    /// path set.
    pub fn add_paths(&mut self, groups: impl IntoIterator<Item = PathGroup>) {
        for g in groups {
            self.paths.insert(g.name.clone(), g);
        }
    }
}

static BUILD_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Exclusive permit for one in-flight trail build.
///
/// A build installs the world at entry and releases it at exit; a second
/// install while one is held is a caller bug, not a recoverable condition.
/// Dropping the permit releases it, after which a new build may start.
#[derive(Debug)]
pub struct BuildPermit {
    _private: (),
}

impl BuildPermit {
    /// # Panics
    ///
    /// Panics when a permit is already held anywhere in the process.
    pub fn acquire() -> BuildPermit {
        if BUILD_ACTIVE.swap(true, Ordering::SeqCst) {
            panic!("a trail build is already in progress; concurrent builds are unsupported");
        }
        BuildPermit { _private: () }
    }
}

impl Drop for BuildPermit {
    fn drop(&mut self) {
        BUILD_ACTIVE.store(false, Ordering::SeqCst);
    }
}
