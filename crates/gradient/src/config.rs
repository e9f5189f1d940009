use crate::error::EngineError;

/// Bounds on the palette accepted by the engine; the first entry is the
/// base color, every further entry feeds one wave layer.
pub const MIN_COLORS: usize = 1;
pub const MAX_COLORS: usize = 10;

/// Validated engine configuration.
///
/// Immutable after construction except `time`, which the owner may read
/// and rewrite between ticks (for example to preserve the animation
/// position across a reconstruction). Produced only by
/// [`GradientConfigBuilder`]; an invalid palette or parameter is a
/// configuration error, never a runtime fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientConfig {
    /// Vertex displacement amplitude in pixels.
    pub amplitude: f32,
    /// Parsed palette, RGB in 0..1. `colors[0]` is the base color.
    pub colors: Vec<[f32; 3]>,
    /// Tessellation factors for the x and z axes.
    pub density: [f32; 2],
    /// Target frames per second; the frame interval is `1000 / fps` ms.
    pub fps: u32,
    /// Noise seed shared by all wave layers.
    pub seed: f32,
    /// Time multiplier applied per rendered frame.
    pub speed: f32,
    /// Animation clock in milliseconds.
    pub time: f64,
    /// Draw mesh edges (lines) instead of filled triangles.
    pub wireframe: bool,
}

impl GradientConfig {
    pub fn builder() -> GradientConfigBuilder {
        GradientConfigBuilder::default()
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        GradientConfigBuilder::default()
            .build()
            .expect("default configuration is valid")
    }
}

/// Pure builder that merges caller overrides over the documented
/// defaults and validates everything in one place.
#[derive(Debug, Clone, Default)]
pub struct GradientConfigBuilder {
    amplitude: Option<f32>,
    colors: Option<Vec<String>>,
    density: Option<[f32; 2]>,
    fps: Option<u32>,
    seed: Option<f32>,
    speed: Option<f32>,
    time: Option<f64>,
    wireframe: Option<bool>,
}

const DEFAULT_COLORS: [&str; 4] = ["#ef008f", "#6ec3f4", "#7038ff", "#ffba27"];

impl GradientConfigBuilder {
    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    /// Palette as color strings (`#rgb` or `#rrggbb`), base color first.
    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn density(mut self, density: [f32; 2]) -> Self {
        self.density = Some(density);
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn seed(mut self, seed: f32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn time(mut self, time_ms: f64) -> Self {
        self.time = Some(time_ms);
        self
    }

    pub fn wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = Some(wireframe);
        self
    }

    pub fn build(self) -> Result<GradientConfig, EngineError> {
        let raw_colors = self
            .colors
            .unwrap_or_else(|| DEFAULT_COLORS.iter().map(|s| s.to_string()).collect());
        if raw_colors.len() < MIN_COLORS || raw_colors.len() > MAX_COLORS {
            return Err(EngineError::Configuration(format!(
                "expected between {MIN_COLORS} and {MAX_COLORS} colors, got {}",
                raw_colors.len()
            )));
        }
        let colors = raw_colors
            .iter()
            .map(|raw| parse_hex_color(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let amplitude = self.amplitude.unwrap_or(320.0);
        if !(amplitude > 0.0) {
            return Err(EngineError::Configuration(format!(
                "amplitude must be positive, got {amplitude}"
            )));
        }

        let density = self.density.unwrap_or([0.06, 0.16]);
        if !(density[0] > 0.0 && density[1] > 0.0) {
            return Err(EngineError::Configuration(format!(
                "density factors must both be positive, got [{}, {}]",
                density[0], density[1]
            )));
        }

        let fps = self.fps.unwrap_or(24);
        if fps == 0 {
            return Err(EngineError::Configuration(
                "fps must be a positive integer".into(),
            ));
        }

        Ok(GradientConfig {
            amplitude,
            colors,
            density,
            fps,
            seed: self.seed.unwrap_or(0.0),
            speed: self.speed.unwrap_or(1.25),
            time: self.time.unwrap_or(0.0),
            wireframe: self.wireframe.unwrap_or(false),
        })
    }
}

/// Parses `#rgb` or `#rrggbb` into an RGB triple in 0..1.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], EngineError> {
    let invalid = || EngineError::Configuration(format!("'{raw}' is not a valid color string"));

    let digits = raw.strip_prefix('#').ok_or_else(invalid)?;
    // Length and slicing below are byte-based; multibyte input can never
    // be a hex digit anyway.
    if !digits.is_ascii() {
        return Err(invalid());
    }
    let expanded = match digits.len() {
        3 => digits
            .chars()
            .flat_map(|c| [c, c])
            .collect::<String>(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };

    let mut channels = [0.0_f32; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        *channel = byte as f32 / 255.0;
    }
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GradientConfig::default();
        assert_eq!(config.amplitude, 320.0);
        assert_eq!(config.colors.len(), 4);
        assert_eq!(config.density, [0.06, 0.16]);
        assert_eq!(config.fps, 24);
        assert_eq!(config.seed, 0.0);
        assert_eq!(config.speed, 1.25);
        assert_eq!(config.time, 0.0);
        assert!(!config.wireframe);
    }

    #[test]
    fn parses_long_and_short_hex_forms() {
        assert_eq!(parse_hex_color("#ffffff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(parse_hex_color("#fff").unwrap(), [1.0, 1.0, 1.0]);
        let magenta = parse_hex_color("#ef008f").unwrap();
        assert!((magenta[0] - 239.0 / 255.0).abs() < 1e-6);
        assert_eq!(magenta[1], 0.0);
        assert!((magenta[2] - 143.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_color_strings() {
        for raw in ["ef008f", "#ef008", "#gg0000", "", "#"] {
            assert!(
                matches!(parse_hex_color(raw), Err(EngineError::Configuration(_))),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_multibyte_color_strings_without_panicking() {
        // These land on the 3- and 6-byte length branches but are not
        // hex digits; they must fail as configuration errors, not on a
        // char boundary.
        for raw in ["#€", "#aààx", "#日", "#ひらがな"] {
            assert!(
                matches!(parse_hex_color(raw), Err(EngineError::Configuration(_))),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_and_oversized_palettes() {
        let empty = GradientConfig::builder()
            .colors(Vec::<String>::new())
            .build();
        assert!(matches!(empty, Err(EngineError::Configuration(_))));

        let eleven = GradientConfig::builder()
            .colors(vec!["#ffffff"; 11])
            .build();
        assert!(matches!(eleven, Err(EngineError::Configuration(_))));

        let one = GradientConfig::builder().colors(vec!["#ffffff"]).build();
        assert!(one.is_ok());
    }

    #[test]
    fn rejects_invalid_scalar_parameters() {
        assert!(GradientConfig::builder().amplitude(0.0).build().is_err());
        assert!(GradientConfig::builder().amplitude(-1.0).build().is_err());
        assert!(GradientConfig::builder().density([0.0, 0.1]).build().is_err());
        assert!(GradientConfig::builder().fps(0).build().is_err());
    }

    #[test]
    fn invalid_palette_wins_over_other_fields() {
        let result = GradientConfig::builder()
            .colors(vec!["not-a-color"])
            .amplitude(100.0)
            .build();
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }
}
