use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "meshwave",
    author,
    version,
    about = "Animated flowing-gradient renderer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, default_value = "1280x720")]
    pub size: (u32, u32),

    /// Palette as comma-separated hex colors, base color first
    /// (e.g. `#ef008f,#6ec3f4,#7038ff,#ffba27`).
    #[arg(long, value_name = "COLORS", value_delimiter = ',')]
    pub colors: Option<Vec<String>>,

    /// Load the palette from a JSON file holding an array of hex colors.
    #[arg(long, value_name = "FILE")]
    pub palette: Option<PathBuf>,

    /// Load base settings from a TOML profile; explicit flags win.
    #[arg(long, value_name = "FILE", env = "MESHWAVE_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Mesh density factors for the x and z axes (e.g. `0.06x0.16`).
    #[arg(long, value_name = "DXxDZ", value_parser = parse_density)]
    pub density: Option<[f32; 2]>,

    /// Target frames per second.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Animation speed multiplier.
    #[arg(long, value_name = "FACTOR")]
    pub speed: Option<f32>,

    /// Vertex displacement amplitude in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub amplitude: Option<f32>,

    /// Noise seed; equal seeds reproduce the same animation.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<f32>,

    /// Starting point of the animation clock in milliseconds.
    #[arg(long, value_name = "MILLISECONDS")]
    pub time: Option<f64>,

    /// Draw mesh edges instead of filled triangles. Bare `--wireframe`
    /// enables it; `--wireframe false` overrides a profile that set it.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub wireframe: Option<bool>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{trimmed}' must be non-zero in both axes"));
    }
    Ok((width, height))
}

pub fn parse_density(value: &str) -> Result<[f32; 2], String> {
    let trimmed = value.trim();
    let (dx, dz) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid density '{trimmed}'; expected DXxDZ"))?;
    let dx: f32 = dx
        .trim()
        .parse()
        .map_err(|_| format!("invalid x density in '{trimmed}'"))?;
    let dz: f32 = dz
        .trim()
        .parse()
        .map_err(|_| format!("invalid z density in '{trimmed}'"))?;
    if !(dx > 0.0 && dz > 0.0) {
        return Err(format!("density '{trimmed}' must be positive in both axes"));
    }
    Ok([dx, dz])
}
