//! Animated flowing-gradient engine.
//!
//! The crate renders a stripe-style animated gradient: a densely
//! tessellated full-screen plane whose vertices are displaced and
//! colored by layered simplex noise, one layer per palette entry beyond
//! the base color. The overall flow is:
//!
//! ```text
//!   GradientConfigBuilder ──▶ GradientConfig
//!                                  │
//!                                  ▼
//!   GradientEngine::create ──▶ GpuContext + WaveModel + PlaneGeometry
//!                                  │                        │
//!                                  ▼                        ▼
//!                          ClipSpaceProgram ◀── UniformTable (std140)
//!                                  │
//!   host redraw ─▶ tick() ─▶ RenderState plan ─▶ draw / skip / idle
//! ```
//!
//! [`GradientEngine`] owns every GPU resource; the host owns the window
//! and the event loop and calls [`GradientEngine::tick`] on each redraw.
//! All animation state is a deterministic function of the configuration
//! (palette, seed, speed, time), so two engines built from the same
//! [`GradientConfig`] produce the same animation.

mod compile;
pub mod config;
pub mod driver;
mod engine;
pub mod error;
pub mod geometry;
mod gpu;
pub mod uniforms;
pub mod waves;

pub use config::{GradientConfig, GradientConfigBuilder, MAX_COLORS, MIN_COLORS};
pub use driver::{Phase, TickPlan};
pub use engine::{GradientEngine, TickOutcome};
pub use error::{EngineError, UniformError};
pub use uniforms::{UniformShape, UniformValue};
pub use geometry::PlaneGeometry;
pub use waves::{build_wave_model, WaveLayer, WaveModel, MAX_WAVE_LAYERS};
