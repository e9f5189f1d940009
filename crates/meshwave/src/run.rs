use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use gradient::{EngineError, GradientEngine, TickOutcome};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::cli::Cli;
use crate::profile::resolve_config;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Opens the window and drives the engine through the `winit` loop.
///
/// The engine decides per redraw whether a frame is due; the loop only
/// forwards events and keeps requesting redraws until the engine halts
/// or the window closes. Space toggles play/pause.
pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    tracing::info!(
        colors = config.colors.len(),
        fps = config.fps,
        speed = config.speed,
        seed = config.seed,
        wireframe = config.wireframe,
        "starting meshwave"
    );

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(cli.size.0, cli.size.1);
    let window = WindowBuilder::new()
        .with_title("Meshwave")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut engine = GradientEngine::create(&*window, window.inner_size(), config)
        .context("failed to create gradient engine")?;
    window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            engine.destroy();
                            elwt.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            if let Err(err) = engine.resize(new_size) {
                                tracing::warn!(%err, "resize failed");
                            }
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            let _ = inner_size_writer.request_inner_size(engine.size());
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed
                                && !event.repeat
                                && event.logical_key == Key::Named(NamedKey::Space)
                            {
                                toggle_playback(&mut engine);
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            match engine.tick(Instant::now(), window.inner_size()) {
                                Ok(TickOutcome::Halted) => elwt.exit(),
                                Ok(_) => {}
                                Err(EngineError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                                    tracing::error!("surface out of memory; exiting");
                                    engine.destroy();
                                    elwt.exit();
                                }
                                Err(EngineError::Surface(err)) => {
                                    tracing::warn!(%err, "surface error; retrying next frame");
                                }
                                Err(err) => {
                                    tracing::error!(%err, "engine tick failed; exiting");
                                    engine.destroy();
                                    elwt.exit();
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next tick once winit is about to wait.
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn toggle_playback(engine: &mut GradientEngine) {
    let result = if engine.is_playing() {
        tracing::info!(time_ms = engine.time(), "paused");
        engine.pause()
    } else {
        tracing::info!(time_ms = engine.time(), "resumed");
        engine.play()
    };
    if let Err(err) = result {
        tracing::warn!(%err, "playback toggle ignored");
    }
}
