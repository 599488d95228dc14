///! Timezone-from-coordinates lookup

use tzf_rs::DefaultFinder;

pub trait TimezoneLookup: Send + Sync {
    /// IANA identifier for the zone containing the point, if any
    fn timezone_for(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// Polygon lookup backed by the tzf-rs bundled boundary data.
///
/// Building the finder decompresses the boundary set; create one per process
/// and share it.
pub struct TzfLookup {
    finder: DefaultFinder,
}

impl TzfLookup {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneLookup for TzfLookup {
    fn timezone_for(&self, latitude: f64, longitude: f64) -> Option<String> {
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}
