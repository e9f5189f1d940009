//! Deterministic wave-layer model.
//!
//! Each palette entry beyond the base color contributes one noise-driven
//! layer. The parameters are a pure function of the layer index, the
//! seed, and the palette length, so two engines built from the same
//! configuration animate identically.

/// Hardware cap on blended layers; the shader loop is sized to this.
pub const MAX_WAVE_LAYERS: usize = 9;

/// Parameter set for one noise-driven color layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveLayer {
    pub color: [f32; 3],
    pub noise_freq: [f32; 2],
    pub noise_flow: f32,
    pub noise_floor: f32,
    pub noise_ceil: f32,
    pub noise_seed: f32,
    pub noise_speed: f32,
    pub active: bool,
}

impl WaveLayer {
    /// Sentinel used to pad the layer array up to [`MAX_WAVE_LAYERS`] so
    /// the shader can early-exit its blend loop.
    pub const INACTIVE: Self = Self {
        color: [0.0; 3],
        noise_freq: [0.0; 2],
        noise_flow: 0.0,
        noise_floor: 0.0,
        noise_ceil: 0.0,
        noise_seed: 0.0,
        noise_speed: 0.0,
        active: false,
    };
}

/// Base color plus the full (padded) layer array.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveModel {
    pub base_color: [f32; 3],
    pub layers: [WaveLayer; MAX_WAVE_LAYERS],
    pub active_count: usize,
}

/// Derives the layer parameters from a validated palette.
///
/// For layer number `j` (1-indexed) out of `N = colors.len()`:
/// ceil `0.63 + 0.07·j`, floor `0.1`, flow `6.5 + 0.3·j`, frequency
/// `[2 + j/N, 3 + j/N]`, seed `seed + 10·j`, speed `11 + 0.3·j`.
pub fn build_wave_model(colors: &[[f32; 3]], seed: f32) -> WaveModel {
    let n = colors.len();
    let active_count = n.saturating_sub(1).min(MAX_WAVE_LAYERS);

    let mut layers = [WaveLayer::INACTIVE; MAX_WAVE_LAYERS];
    for (slot, layer) in layers.iter_mut().take(active_count).enumerate() {
        let j = (slot + 1) as f32;
        *layer = WaveLayer {
            color: colors[slot + 1],
            noise_freq: [2.0 + j / n as f32, 3.0 + j / n as f32],
            noise_flow: 6.5 + 0.3 * j,
            noise_floor: 0.1,
            noise_ceil: 0.63 + 0.07 * j,
            noise_seed: seed + 10.0 * j,
            noise_speed: 11.0 + 0.3 * j,
            active: true,
        };
    }

    WaveModel {
        base_color: colors[0],
        layers,
        active_count,
    }
}
