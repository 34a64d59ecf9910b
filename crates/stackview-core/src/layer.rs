use serde::{Deserialize, Serialize};

/// Base RGB color of a layer, components in `[0, 1]`.
///
/// Deserializes from a 3- or 4-element array; a trailing alpha is ignored
/// since layer alpha is derived from camera distance at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "[f32; 3]")]
pub struct LayerColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for LayerColor {
    fn default() -> Self {
        Self {
            r: 0.5,
            g: 0.5,
            b: 0.5,
        }
    }
}

impl LayerColor {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert hue/saturation/value (all in `[0, 1]`) to RGB.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        if s == 0.0 {
            return Self::new(v, v, v);
        }
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match (sector as i32).rem_euclid(6) {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }

    pub fn to_f32_array(&self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Scale each component toward black by `percent`.
    pub fn darken(&self, percent: f32, alpha: f32) -> [f32; 4] {
        let k = (100.0 - percent) / 100.0;
        [self.r * k, self.g * k, self.b * k, alpha]
    }

    /// Move each component toward white by `percent`.
    pub fn lighten(&self, percent: f32, alpha: f32) -> [f32; 4] {
        let k = percent / 100.0;
        [
            self.r + (1.0 - self.r) * k,
            self.g + (1.0 - self.g) * k,
            self.b + (1.0 - self.b) * k,
            alpha,
        ]
    }
}

impl TryFrom<Vec<f32>> for LayerColor {
    type Error = String;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [r, g, b] | [r, g, b, _] => Ok(Self::new(*r, *g, *b)),
            other => Err(format!(
                "layer color needs 3 or 4 components, got {}",
                other.len()
            )),
        }
    }
}

impl From<LayerColor> for [f32; 3] {
    fn from(c: LayerColor) -> Self {
        [c.r, c.g, c.b]
    }
}

/// A process layer: where it sits in the stack and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub gds_layer: u16,
    pub gds_datatype: u16,
    /// Height of the layer's upper surface, in nanometers.
    pub elevation: f64,
    /// Extrusion height in nanometers. Zero means a flat layer without walls.
    pub thickness: f64,
    pub color: LayerColor,
}

impl LayerSpec {
    pub fn new(name: &str, gds_layer: u16, gds_datatype: u16) -> Self {
        Self {
            name: name.to_string(),
            gds_layer,
            gds_datatype,
            elevation: 0.0,
            thickness: 0.0,
            color: LayerColor::default(),
        }
    }

    pub fn with_extrusion(mut self, elevation: f64, thickness: f64) -> Self {
        self.elevation = elevation;
        self.thickness = thickness;
        self
    }

    pub fn with_hsv(mut self, h: f32, s: f32, v: f32) -> Self {
        self.color = LayerColor::from_hsv(h, s, v);
        self
    }

    /// Label used in dataset files, e.g. `"68/20"`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.gds_layer, self.gds_datatype)
    }
}

/// An ordered collection of layers representing a technology stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<LayerSpec>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn add_layer(&mut self, layer: LayerSpec) {
        self.layers.push(layer);
    }

    pub fn get_layer_by_gds(&self, gds_layer: u16, gds_datatype: u16) -> Option<&LayerSpec> {
        self.layers
            .iter()
            .find(|l| l.gds_layer == gds_layer && l.gds_datatype == gds_datatype)
    }

    /// Look up a layer by its `"layer/datatype"` label.
    pub fn get_layer_by_label(&self, label: &str) -> Option<&LayerSpec> {
        let (layer, datatype) = label.split_once('/')?;
        let layer = layer.trim().parse().ok()?;
        let datatype = datatype.trim().parse().ok()?;
        self.get_layer_by_gds(layer, datatype)
    }

    pub fn all_layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// SkyWater 130nm stack, substrate through metal 5.
    pub fn sky130() -> Self {
        let mut stack = Self::new();
        let layers = [
            ("p-substrate", 235, 4, 0.0, 0.0, (0.0 / 3.0, 0.7, 0.35)),
            ("n-well", 64, 20, 0.0, 0.0, (2.0 / 3.0, 0.7, 0.35)),
            ("diff (opp.)", 65, 20, 0.0, 0.0, (2.0 / 3.0, 0.0, 0.15)),
            ("tap (same)", 65, 44, 0.0, 0.0, (2.0 / 3.0, 0.0, 0.15)),
            ("poly", 66, 20, 500.0, 400.0, (1.5 / 3.0, 0.55, 0.25)),
            ("nwell.pin", 64, 16, 940.0, 940.0, (0.4 / 3.0, 0.65, 0.3)),
            ("pwell.pin", 122, 16, 940.0, 940.0, (0.4 / 3.0, 0.65, 0.3)),
            ("licon", 66, 44, 940.0, 940.0, (0.4 / 3.0, 0.65, 0.3)),
            ("li", 67, 20, 1011.0, 100.0, (0.4 / 3.0, 0.65, 0.3)),
            ("mcon", 67, 44, 1380.0, 380.0, (1.0 / 3.0, 0.8, 0.45)),
            ("m1", 68, 20, 1380.0 + 360.0, 360.0, (1.0 / 3.0, 0.8, 0.45)),
            ("via", 68, 44, 2000.0, 270.0, (1.0 / 3.0, 0.8, 0.6)),
            ("m2", 69, 20, 2000.0 + 360.0, 360.0, (1.0 / 3.0, 0.8, 0.6)),
            ("via2", 69, 44, 2790.0, 420.0, (1.0 / 3.0, 0.8, 0.7)),
            ("m3", 70, 20, 2790.0 + 850.0, 850.0, (1.0 / 3.0, 0.8, 0.7)),
            ("via3", 70, 44, 4020.0, 390.0, (1.0 / 3.0, 0.8, 0.8)),
            ("m4", 71, 20, 4020.0 + 850.0, 850.0, (1.0 / 3.0, 0.8, 0.8)),
            ("via4", 71, 44, 5370.0, 510.0, (1.0 / 3.0, 0.8, 0.9)),
            ("m5", 72, 20, 5370.0 + 1260.0, 1260.0, (1.0 / 3.0, 0.8, 0.9)),
        ];
        for (name, gds_layer, gds_datatype, elevation, thickness, (h, s, v)) in layers {
            stack.add_layer(
                LayerSpec::new(name, gds_layer, gds_datatype)
                    .with_extrusion(elevation, thickness)
                    .with_hsv(h, s, v),
            );
        }
        stack
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb(c: LayerColor, r: f32, g: f32, b: f32) {
        assert!((c.r - r).abs() < 1e-6, "r: {} vs {}", c.r, r);
        assert!((c.g - g).abs() < 1e-6, "g: {} vs {}", c.g, g);
        assert!((c.b - b).abs() < 1e-6, "b: {} vs {}", c.b, b);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_rgb(LayerColor::from_hsv(0.0, 1.0, 1.0), 1.0, 0.0, 0.0);
        assert_rgb(LayerColor::from_hsv(1.0 / 3.0, 1.0, 1.0), 0.0, 1.0, 0.0);
        assert_rgb(LayerColor::from_hsv(2.0 / 3.0, 1.0, 1.0), 0.0, 0.0, 1.0);
        assert_rgb(LayerColor::from_hsv(0.5, 0.0, 0.25), 0.25, 0.25, 0.25);
    }

    #[test]
    fn test_shades() {
        let c = LayerColor::new(0.5, 0.2, 1.0);
        let dark = c.darken(80.0, 0.5);
        assert!((dark[0] - 0.1).abs() < 1e-6);
        assert!((dark[1] - 0.04).abs() < 1e-6);
        assert!((dark[3] - 0.5).abs() < 1e-6);
        let light = c.lighten(70.0, 1.0);
        assert!((light[0] - 0.85).abs() < 1e-6);
        assert!((light[2] - 1.0).abs() < 1e-6);
        assert_eq!(c.lighten(0.0, 1.0), c.to_f32_array(1.0));
    }

    #[test]
    fn test_color_from_json() {
        let c: LayerColor = serde_json::from_str("[0.1, 0.2, 0.3, 1.0]").unwrap();
        assert_rgb(c, 0.1, 0.2, 0.3);
        let c: LayerColor = serde_json::from_str("[0.1, 0.2, 0.3]").unwrap();
        assert_rgb(c, 0.1, 0.2, 0.3);
        assert!(serde_json::from_str::<LayerColor>("[0.1, 0.2]").is_err());
        assert_eq!(
            serde_json::to_string(&LayerColor::new(1.0, 0.0, 0.5)).unwrap(),
            "[1.0,0.0,0.5]"
        );
    }

    #[test]
    fn test_sky130_lookup() {
        let stack = LayerStack::sky130();
        assert_eq!(stack.layer_count(), 19);
        let m1 = stack.get_layer_by_label("68/20").unwrap();
        assert_eq!(m1.name, "m1");
        assert!((m1.elevation - 1740.0).abs() < 1e-9);
        assert!((m1.thickness - 360.0).abs() < 1e-9);
        assert_eq!(m1.label(), "68/20");
        assert!(stack.get_layer_by_label("1/2").is_none());
        assert!(stack.get_layer_by_label("m1").is_none());
    }
}
