//! GLSL compilation through naga, with aggregated diagnostics.
//!
//! Both stages compile inside `wgpu` validation error scopes so that a
//! broken program reports every collected message at once instead of
//! only the first failure. Partially created modules are dropped before
//! the error returns, leaving no shader objects behind.

use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::EngineError;

/// The plane-deformation vertex stage, embedded verbatim.
pub(crate) const VERTEX_SHADER_GLSL: &str = include_str!("shaders/gradient.vert");

/// The shadow-darkening fragment stage, embedded verbatim.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = include_str!("shaders/gradient.frag");

pub(crate) struct ShaderPair {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Compiles the vertex+fragment source pair into shader modules.
pub(crate) fn compile_shader_pair(
    device: &wgpu::Device,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ShaderPair, EngineError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("gradient vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(vertex_source),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    });
    let vertex_error = pollster::block_on(device.pop_error_scope());

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("gradient fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(fragment_source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    let fragment_error = pollster::block_on(device.pop_error_scope());

    let mut diagnostics = Vec::new();
    if let Some(error) = vertex_error {
        diagnostics.push(format!("vertex: {error}"));
    }
    if let Some(error) = fragment_error {
        diagnostics.push(format!("fragment: {error}"));
    }
    if !diagnostics.is_empty() {
        // Dropping `vertex`/`fragment` here releases whichever module
        // did come into existence.
        return Err(EngineError::ProgramLink { diagnostics });
    }

    Ok(ShaderPair { vertex, fragment })
}
