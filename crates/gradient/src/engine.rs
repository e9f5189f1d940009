//! Engine assembly and lifecycle.
//!
//! [`GradientEngine`] wires the pieces together: GPU context, wave
//! model, tessellated plane, clip-space program, and the animation
//! driver. The host owns the event loop and calls in on every redraw;
//! the engine decides per tick whether to draw, skip, or halt.

use std::time::Instant;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::config::GradientConfig;
use crate::driver::{RenderState, TickPlan};
use crate::error::EngineError;
use crate::geometry::PlaneGeometry;
use crate::gpu::context::GpuContext;
use crate::gpu::program::ClipSpaceProgram;
use crate::uniforms::{gradient_params_table, UniformValue};
use crate::waves::{build_wave_model, WaveModel};

/// What one engine tick did, for the host's scheduling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was rendered and presented.
    Drew,
    /// Inside the frame interval, or the swapchain needed rebuilding;
    /// keep scheduling.
    Skipped,
    /// Not running (initializing or paused); keep scheduling.
    Idle,
    /// Destroyed; stop scheduling.
    Halted,
}

/// The fragment shadow steepens on narrow surfaces so the darkened
/// corner keeps roughly the same visual weight.
fn shadow_power_for(size: PhysicalSize<u32>) -> f32 {
    if size.width < 600 {
        6.0
    } else {
        5.0
    }
}

/// What a resize request must do, decided before any GPU work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResizePlan {
    /// Size unchanged, or a transient zero from a minimised window.
    Keep,
    /// Reconfigure the swapchain, regenerate the mesh, and refresh the
    /// resolution-coupled uniforms, all before the next draw.
    Rebuild,
}

fn plan_resize(cached: PhysicalSize<u32>, live: PhysicalSize<u32>) -> ResizePlan {
    if live == cached || live.width == 0 || live.height == 0 {
        ResizePlan::Keep
    } else {
        ResizePlan::Rebuild
    }
}

/// The animated gradient engine.
///
/// Construction acquires the GPU context, derives the wave model from
/// the palette, tessellates the plane, and links the shader program;
/// any failure is fatal and leaves nothing behind. Afterwards the
/// surface is driven through [`GradientEngine::tick`] until
/// [`GradientEngine::destroy`].
pub struct GradientEngine {
    config: GradientConfig,
    context: GpuContext,
    program: ClipSpaceProgram,
    state: RenderState,
    waves: WaveModel,
    cached_size: PhysicalSize<u32>,
}

impl GradientEngine {
    /// Builds the engine against a windowing target and starts playback.
    pub fn create<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: GradientConfig,
    ) -> Result<Self, EngineError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.wireframe)?;
        let waves = build_wave_model(&config.colors, config.seed);
        let geometry = PlaneGeometry::generate(context.size.width, context.size.height, config.density);

        let mut uniforms = gradient_params_table();
        uniforms.set(
            "resolution",
            UniformValue::Vec2([context.size.width as f32, context.size.height as f32]),
        )?;
        uniforms.set("realtime", UniformValue::Scalar(config.time as f32))?;
        uniforms.set("amplitude", UniformValue::Scalar(config.amplitude))?;
        uniforms.set("baseColor", UniformValue::Vec3(waves.base_color))?;
        uniforms.set(
            "shadowPower",
            UniformValue::Scalar(shadow_power_for(context.size)),
        )?;
        uniforms.set("activeLayers", UniformValue::Int(waves.active_count as i32))?;
        for (index, layer) in waves.layers.iter().enumerate() {
            let key = |member: &str| format!("waveLayers[{index}].{member}");
            uniforms.set(&key("color"), UniformValue::Vec3(layer.color))?;
            uniforms.set(&key("noiseFreq"), UniformValue::Vec2(layer.noise_freq))?;
            uniforms.set(&key("noiseSpeed"), UniformValue::Scalar(layer.noise_speed))?;
            uniforms.set(&key("noiseFlow"), UniformValue::Scalar(layer.noise_flow))?;
            uniforms.set(&key("noiseSeed"), UniformValue::Scalar(layer.noise_seed))?;
            uniforms.set(&key("noiseFloor"), UniformValue::Scalar(layer.noise_floor))?;
            uniforms.set(&key("noiseCeil"), UniformValue::Scalar(layer.noise_ceil))?;
            uniforms.set(
                &key("active"),
                UniformValue::Scalar(if layer.active { 1.0 } else { 0.0 }),
            )?;
        }

        let program = ClipSpaceProgram::new(
            &context.device,
            context.surface_format,
            &geometry,
            uniforms,
            config.wireframe && context.line_mode,
        )?;

        tracing::info!(
            layers = waves.active_count,
            grid_x = geometry.grid_x,
            grid_z = geometry.grid_z,
            vertices = geometry.vertex_count(),
            "gradient engine ready"
        );

        let mut state = RenderState::new(config.fps, config.speed, config.time, config.seed);
        state.play()?;
        let cached_size = context.size;

        Ok(Self {
            config,
            context,
            program,
            state,
            waves,
            cached_size,
        })
    }

    /// Advances the animation by one scheduled tick.
    ///
    /// `live_size` is the surface size the host currently observes;
    /// when it differs from the engine's cached size the mesh and
    /// swapchain are rebuilt before the frame is drawn, so a draw never
    /// presents stale geometry.
    pub fn tick(
        &mut self,
        now: Instant,
        live_size: PhysicalSize<u32>,
    ) -> Result<TickOutcome, EngineError> {
        match self.state.plan_tick(now) {
            TickPlan::Halt => Ok(TickOutcome::Halted),
            TickPlan::Idle => Ok(TickOutcome::Idle),
            TickPlan::Skip { check_resize } => {
                if check_resize {
                    self.resize(live_size)?;
                }
                Ok(TickOutcome::Skipped)
            }
            TickPlan::Draw { time_ms } => {
                self.resize(live_size)?;
                self.program
                    .set_uniform("realtime", UniformValue::Scalar(time_ms as f32))?;
                self.render()
            }
        }
    }

    fn render(&mut self) -> Result<TickOutcome, EngineError> {
        self.program.flush_uniforms(&self.context.queue)?;

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                // Recoverable: rebuild the swapchain and let the next
                // tick try again.
                self.context.reconfigure();
                return Ok(TickOutcome::Skipped);
            }
            Err(err) => return Err(EngineError::Surface(err)),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gradient encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gradient pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.program.record(&mut render_pass);
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(TickOutcome::Drew)
    }

    /// Applies a new surface size: reconfigures the swapchain, rebuilds
    /// the plane at the configured density, and refreshes the
    /// resolution-coupled uniforms. Equal and zero sizes are no-ops.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> Result<(), EngineError> {
        if self.state.is_destroyed() {
            return Err(EngineError::ResourceState);
        }
        if plan_resize(self.cached_size, new_size) == ResizePlan::Keep {
            return Ok(());
        }

        tracing::debug!(
            from = ?(self.cached_size.width, self.cached_size.height),
            to = ?(new_size.width, new_size.height),
            "resizing gradient surface"
        );
        self.context.resize(new_size);
        self.cached_size = new_size;

        let geometry =
            PlaneGeometry::generate(new_size.width, new_size.height, self.config.density);
        self.program
            .set_attribute(&self.context.device, &self.context.queue, &geometry.positions)?;
        self.program
            .set_elements(&self.context.device, &self.context.queue, &geometry.indices)?;
        self.program.set_uniform(
            "resolution",
            UniformValue::Vec2([new_size.width as f32, new_size.height as f32]),
        )?;
        self.program.set_uniform(
            "shadowPower",
            UniformValue::Scalar(shadow_power_for(new_size)),
        )?;
        Ok(())
    }

    /// Resumes the animation clock.
    pub fn play(&mut self) -> Result<(), EngineError> {
        self.state.play()
    }

    /// Freezes the animation clock; the last frame stays presented.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.state.pause()
    }

    pub fn is_playing(&self) -> bool {
        self.state.phase() == crate::driver::Phase::Running
    }

    /// Reads the current value of a uniform slot by semantic name,
    /// including flattened layer keys such as `waveLayers[2].noiseSeed`.
    pub fn uniform(&self, name: &str) -> Result<UniformValue, EngineError> {
        self.program.uniform(name)
    }

    /// Accumulated animation time in milliseconds.
    pub fn time(&self) -> f64 {
        self.state.time_ms()
    }

    /// Rewinds or fast-forwards the animation clock.
    pub fn set_time(&mut self, time_ms: f64) {
        self.state.set_time_ms(time_ms);
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    pub fn wave_count(&self) -> usize {
        self.waves.active_count
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.cached_size
    }

    /// Tears the engine down: halts the driver and releases the GPU
    /// buffers. Never errors and safe to call repeatedly; every later
    /// operation except another `destroy()` reports
    /// [`EngineError::ResourceState`].
    pub fn destroy(&mut self) {
        if self.state.is_destroyed() {
            return;
        }
        self.state.destroy();
        self.program.delete();
        tracing::info!("gradient engine destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_destroyed() && self.program.is_deleted()
    }
}
