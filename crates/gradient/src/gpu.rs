//! GPU-facing internals: context acquisition and the clip-space
//! program wrapper. No other module holds direct references to the
//! buffers or pipeline these own.

pub(crate) mod context;
pub(crate) mod program;
