use thiserror::Error;

/// Misuse of the uniform table: unknown semantic name or a value whose
/// shape does not match the declared descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UniformError {
    #[error("unknown uniform '{0}'")]
    UnknownName(String),
    #[error("uniform '{name}' expects {expected}, got {got}")]
    ShapeMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },
}

/// Error taxonomy for the gradient engine.
///
/// Construction-time errors (`Configuration`, `ContextAcquisition`,
/// `ProgramLink`) are fatal and leave no GPU resources behind; the
/// remaining variants surface misuse or render-loop failures that the
/// host may recover from.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The supplied configuration failed validation before any GPU work.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The surface could not yield an adapter, device, or swapchain.
    #[error("failed to acquire GPU context: {0}")]
    ContextAcquisition(String),
    /// Shader compilation or pipeline linking failed. `diagnostics`
    /// aggregates every message collected from both stages and the link
    /// step rather than only the first failure.
    #[error("shader program failed to build:\n{}", diagnostics.join("\n"))]
    ProgramLink { diagnostics: Vec<String> },
    /// An operation was invoked after `destroy()`.
    #[error("operation invoked after destroy()")]
    ResourceState,
    #[error(transparent)]
    Uniform(#[from] UniformError),
    /// A swapchain error the engine chose not to swallow; the host
    /// decides whether to stop scheduling or retry.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
