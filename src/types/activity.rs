use serde::{Deserialize, Serialize};

pub const RUN: &str = "Run";

/// One activity as returned by `/athlete/activities` (summary) or
/// `/activities/{id}` (detail). Fields missing from the payload fall back to
/// zero so that sums over a collection never fail.
#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Meters.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub moving_time: u64,
    /// Seconds.
    #[serde(default)]
    pub elapsed_time: u64,
    /// Meters per second.
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Meters.
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub map: Option<ActivityMap>,
}

impl Activity {
    pub fn is_run(&self) -> bool {
        self.kind == RUN
    }

    /// Full-resolution polyline if the detail endpoint supplied one,
    /// otherwise the summary polyline. Empty strings count as absent.
    pub fn route_polyline(&self) -> Option<&str> {
        let map = self.map.as_ref()?;
        map.polyline
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| map.summary_polyline.as_deref().filter(|p| !p.is_empty()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityMap {
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub summary_polyline: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

impl RoutePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}
