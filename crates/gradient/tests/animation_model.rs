//! End-to-end checks of the CPU-side animation model: configuration,
//! wave derivation, tessellation, and frame pacing together, with no
//! GPU in the loop.

use std::time::{Duration, Instant};

use gradient::driver::RenderState;
use gradient::{build_wave_model, GradientConfig, PlaneGeometry, TickPlan, MAX_WAVE_LAYERS};

#[test]
fn default_configuration_reproduces_the_documented_scene() {
    let config = GradientConfig::default();
    let model = build_wave_model(&config.colors, config.seed);

    assert_eq!(model.active_count, 3);
    assert_eq!(model.base_color, config.colors[0]);

    let geometry = PlaneGeometry::generate(800, 600, config.density);
    assert_eq!((geometry.grid_x, geometry.grid_z), (48, 96));
    assert_eq!(geometry.vertex_count(), 4753);
    assert_eq!(geometry.index_count(), 27648);
}

#[test]
fn equal_configurations_animate_identically() {
    let build = || {
        GradientConfig::builder()
            .colors(vec!["#ef008f", "#6ec3f4", "#7038ff"])
            .seed(11.0)
            .fps(30)
            .speed(1.5)
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());
    assert_eq!(
        build_wave_model(&a.colors, a.seed),
        build_wave_model(&b.colors, b.seed)
    );

    // Identical tick schedules yield identical clocks.
    let origin = Instant::now();
    let drive = |config: &GradientConfig| {
        let mut state = RenderState::new(config.fps, config.speed, config.time, config.seed);
        state.play().unwrap();
        for step in 0..100u64 {
            state.plan_tick(origin + Duration::from_millis(step * 21));
        }
        state.time_ms()
    };
    assert_eq!(drive(&a), drive(&b));
}

#[test]
fn oversized_palettes_saturate_the_layer_cap() {
    let colors = vec![[0.5, 0.5, 0.5]; 10];
    let model = build_wave_model(&colors, 0.0);
    assert_eq!(model.active_count, MAX_WAVE_LAYERS);
}

#[test]
fn paced_clock_matches_fps_and_speed_over_a_second() {
    let config = GradientConfig::builder().fps(50).speed(2.0).build().unwrap();
    let mut state = RenderState::new(config.fps, config.speed, config.time, config.seed);
    state.play().unwrap();

    let origin = Instant::now();
    state.plan_tick(origin);
    let mut draws = 0;
    // Tick exactly on the 20ms cadence for one simulated second.
    for step in 1..=50u64 {
        if let TickPlan::Draw { .. } = state.plan_tick(origin + Duration::from_millis(step * 20)) {
            draws += 1;
        }
    }
    assert_eq!(draws, 50);
    // 50 draws, each advancing 20ms of wall time at 2x speed.
    assert!((state.time_ms() - 2000.0).abs() < 1e-6);
}
