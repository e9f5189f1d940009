use wgpu::util::DeviceExt;

use crate::compile::{compile_shader_pair, FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};
use crate::error::EngineError;
use crate::geometry::{PlaneGeometry, FLOATS_PER_VERTEX};
use crate::uniforms::{UniformTable, UniformValue};

/// The "clip-space" object: one linked program, one rewritable position
/// buffer, one index buffer, and the named uniform table.
///
/// Nothing outside this type touches the pipeline or buffers. After
/// [`ClipSpaceProgram::delete`] every operation short-circuits with
/// [`EngineError::ResourceState`]; `delete` itself stays a safe no-op
/// when repeated.
pub(crate) struct ClipSpaceProgram {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: UniformTable,
    deleted: bool,
}

impl ClipSpaceProgram {
    /// Compiles, links, and uploads the initial buffers.
    ///
    /// Compile and link diagnostics are aggregated into one
    /// [`EngineError::ProgramLink`]; a failure drops everything built
    /// so far, so no GPU resources outlive the error.
    pub(crate) fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        geometry: &PlaneGeometry,
        uniforms: UniformTable,
        wireframe: bool,
    ) -> Result<Self, EngineError> {
        let shaders = compile_shader_pair(device, VERTEX_SHADER_GLSL, FRAGMENT_SHADER_GLSL)?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gradient uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gradient pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        };

        // Link inside an error scope so pipeline diagnostics join the
        // aggregated report instead of hitting the uncaptured handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gradient pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shaders.vertex,
                entry_point: Some("main"),
                buffers: &[vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Geometry emits clockwise triangles; depth is disabled
                // and draw order does the layering, so cull the backs.
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: if wireframe {
                    wgpu::PolygonMode::Line
                } else {
                    wgpu::PolygonMode::Fill
                },
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shaders.fragment,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(EngineError::ProgramLink {
                diagnostics: vec![format!("link: {error}")],
            });
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&geometry.positions);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gradient positions"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_bytes: &[u8] = bytemuck::cast_slice(&geometry.indices);
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gradient indices"),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gradient uniforms"),
            contents: uniforms.bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gradient bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            vertex_capacity: vertex_bytes.len(),
            vertex_buffer,
            index_capacity: index_bytes.len(),
            index_buffer,
            index_count: geometry.index_count(),
            uniform_buffer,
            bind_group,
            uniforms,
            deleted: false,
        })
    }

    fn guard(&self) -> Result<(), EngineError> {
        if self.deleted {
            Err(EngineError::ResourceState)
        } else {
            Ok(())
        }
    }

    /// Writes `value` through the named slot of the uniform table.
    pub(crate) fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), EngineError> {
        self.guard()?;
        self.uniforms.set(name, value)?;
        Ok(())
    }

    /// Reads the current value of a uniform slot.
    pub(crate) fn uniform(&self, name: &str) -> Result<UniformValue, EngineError> {
        self.guard()?;
        Ok(self.uniforms.get(name)?)
    }

    /// Rewrites the position buffer in place; grows the allocation only
    /// when a resize produced more vertices than ever before.
    pub(crate) fn set_attribute(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        positions: &[f32],
    ) -> Result<(), EngineError> {
        self.guard()?;
        let bytes: &[u8] = bytemuck::cast_slice(positions);
        if bytes.len() <= self.vertex_capacity {
            queue.write_buffer(&self.vertex_buffer, 0, bytes);
        } else {
            tracing::debug!(
                previous = self.vertex_capacity,
                required = bytes.len(),
                "growing position buffer"
            );
            self.vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gradient positions"),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            self.vertex_capacity = bytes.len();
        }
        Ok(())
    }

    /// Rewrites the index buffer and the draw-element count.
    pub(crate) fn set_elements(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        indices: &[u32],
    ) -> Result<(), EngineError> {
        self.guard()?;
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        if bytes.len() <= self.index_capacity {
            queue.write_buffer(&self.index_buffer, 0, bytes);
        } else {
            tracing::debug!(
                previous = self.index_capacity,
                required = bytes.len(),
                "growing index buffer"
            );
            self.index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gradient indices"),
                contents: bytes,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });
            self.index_capacity = bytes.len();
        }
        self.index_count = indices.len() as u32;
        Ok(())
    }

    /// Uploads the uniform mirror when a slot changed since last frame.
    pub(crate) fn flush_uniforms(&mut self, queue: &wgpu::Queue) -> Result<(), EngineError> {
        self.guard()?;
        if self.uniforms.take_dirty() {
            queue.write_buffer(&self.uniform_buffer, 0, self.uniforms.bytes());
        }
        Ok(())
    }

    /// Binds pipeline, uniforms, and buffers, then issues the one draw
    /// call over the current index count.
    pub(crate) fn record<'pass>(&'pass self, render_pass: &mut wgpu::RenderPass<'pass>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Releases the program's buffers. Safe to call repeatedly; only
    /// the first call does work.
    pub(crate) fn delete(&mut self) {
        if self.deleted {
            return;
        }
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
        self.deleted = true;
        tracing::debug!("released clip-space program resources");
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.deleted
    }
}
