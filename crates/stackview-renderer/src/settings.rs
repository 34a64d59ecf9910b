use serde::{Deserialize, Serialize};

/// Tunables for the camera, navigation and shading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Closest camera depth (the zoom-in limit is `-z_near`).
    pub z_near: f64,
    /// Farthest camera depth, also the initial one.
    pub z_far: f64,
    pub fovy_degrees: f64,
    /// Scroll units per 100% zoom change.
    pub zoom_scale: f64,
    /// Distance over which a layer fades in as the camera rises above it, in nm.
    pub fade_distance_nm: f64,
    pub clear_color: [f32; 4],
    pub wall_darken_percent: f32,
    pub wall_lighten_percent: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            z_near: 0.1,
            z_far: 8.0,
            fovy_degrees: 15.0,
            zoom_scale: 700.0,
            fade_distance_nm: 500.0,
            clear_color: [0.014, 0.086, 0.179, 1.0],
            wall_darken_percent: 80.0,
            wall_lighten_percent: 70.0,
        }
    }
}

impl ViewerSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
