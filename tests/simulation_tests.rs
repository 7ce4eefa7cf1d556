//! End-to-end simulation scenarios
//!
//! These tests run the public API the way a host does: build a season
//! state, wrap it in the animation loop and render into a real canvas.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use seasonfall::animation::{drive, AnimationLoop, FixedStepClock};
use seasonfall::canvas::{Canvas, Sprite};
use seasonfall::noise::{breeze_noise, WIND_SEED};
use seasonfall::particle::{Leaf, Particle};
use seasonfall::season::{season_for_month, Season, SeasonState, SeasonTable};
use seasonfall::viewport::Viewport;
use seasonfall::wind::WindField;

fn desktop() -> Viewport {
    Viewport::from_host(1280.0, 720.0, 1.0)
}

fn phone() -> Viewport {
    Viewport::from_host(390.0, 844.0, 2.0)
}

fn scene(season: Season, viewport: Viewport, seed: u64) -> AnimationLoop<StdRng> {
    AnimationLoop::new(SeasonState::new(SeasonTable::default(), season), viewport, StdRng::seed_from_u64(seed))
}

#[test]
fn test_noise_bounded_over_long_run() {
    for seed in [0.0, WIND_SEED, -87.5, 1e6] {
        let mut t = 0.0;
        while t < 600_000.0 {
            let n = breeze_noise(t, seed);
            assert!((-1.0..=1.0).contains(&n), "noise({}, {}) = {}", t, seed, n);
            t += 37.0;
        }
    }
}

#[test]
fn test_gust_settles_after_pointer_burst() {
    let mut wind = WindField::new();
    for magnitude in [140.0, 90.0, 220.0, 10.0] {
        wind.trigger(magnitude);
    }
    assert_eq!(wind.gust(), 220.0);

    let mut previous = wind.gust();
    let mut ticks = 0;
    while !wind.is_calm() {
        wind.sample(ticks as f64 * 16.0, 22.0);
        assert!(wind.gust() <= previous);
        assert!(wind.gust() >= 0.0);
        previous = wind.gust();
        ticks += 1;
        assert!(ticks <= 180, "gust never settled");
    }
    assert_eq!(wind.gust(), 0.0);
}

#[test]
fn test_auto_season_covers_every_month() {
    let seasons: Vec<Season> = (0..12).map(season_for_month).collect();
    for season in Season::ALL {
        assert_eq!(seasons.iter().filter(|s| **s == season).count(), 3);
    }
}

#[test]
fn test_no_particle_escapes_in_autumn_storm() {
    let mut anim = scene(Season::Autumn, desktop(), 11);
    let mut canvas = Canvas::new(anim.viewport());
    let mut clock = FixedStepClock::new(0.0, 16.0);

    drive(&mut anim, &mut clock, 600, &mut canvas, |frame, anim, _| {
        if frame % 40 == 0 {
            anim.pointer();
        }
        let vp = *anim.viewport();
        assert!(anim.seasons().leaves().iter().all(|leaf| !leaf.is_out_of_bounds(&vp)));
    });
    assert_eq!(anim.seasons().leaves().len(), 120);
}

#[test]
fn test_winter_scene_on_phone() {
    let mut anim = scene(Season::Winter, phone(), 5);
    assert!(anim.seasons().leaves().is_empty());
    // 320 snowflakes scaled for a constrained viewport
    assert_eq!(anim.seasons().snow().len(), 192);

    let mut canvas = Canvas::new(anim.viewport());
    assert_eq!((canvas.width(), canvas.height()), (780, 1688));

    let mut clock = FixedStepClock::new(0.0, 16.0);
    drive(&mut anim, &mut clock, 120, &mut canvas, |_, anim, _| {
        let vp = *anim.viewport();
        assert!(anim.seasons().snow().iter().all(|f| !f.is_out_of_bounds(&vp)));
    });

    let painted = canvas.frame().pixels().filter(|p| p[3] > 0).count();
    assert!(painted > 0, "snow should leave visible pixels");
}

#[test]
fn test_constrained_population_is_rounded() {
    let mut table = SeasonTable::default();
    table.get_mut(Season::Summer).leaf_count = 37;
    let mut state = SeasonState::new(table, Season::Summer);
    state.rebuild(&phone(), &mut StdRng::seed_from_u64(1));
    // round(37 * 0.6) = round(22.2)
    assert_eq!(state.leaves().len(), 22);
}

#[test]
fn test_repeated_season_switch_replaces_population() {
    let mut anim = scene(Season::Autumn, desktop(), 21);
    let first: Vec<_> = anim.seasons().leaves().iter().map(|l| l.position()).collect();

    assert!(anim.set_season("autumn"));
    assert!(anim.set_season("autumn"));
    let second: Vec<_> = anim.seasons().leaves().iter().map(|l| l.position()).collect();

    assert_eq!(first.len(), 120);
    assert_eq!(second.len(), 120);
    assert_ne!(first, second);
}

#[test]
fn test_sprite_and_fallback_leaves_move_identically() {
    let vp = desktop();
    let sprite: Sprite = Arc::new(RgbaImage::from_pixel(28, 18, Rgba([200, 60, 0, 255])));
    let color = Rgba([210, 105, 30, 255]);

    let mut with_image = Leaf::new(Some(sprite), color, Season::Autumn, &mut StdRng::seed_from_u64(9), false, &vp);
    let mut fallback = Leaf::new(None, color, Season::Autumn, &mut StdRng::seed_from_u64(9), false, &vp);

    let mut canvas = Canvas::new(&vp);
    let mut rng_a = StdRng::seed_from_u64(99);
    let mut rng_b = StdRng::seed_from_u64(99);
    for i in 0..200 {
        let t = i as f64 * 16.0;
        with_image.step(16.0, t, 30.0, 30.0, &vp, &mut rng_a);
        fallback.step(16.0, t, 30.0, 30.0, &vp, &mut rng_b);
        with_image.draw(&mut canvas);
        fallback.draw(&mut canvas);
        assert_eq!(with_image.position(), fallback.position());
    }
}

#[test]
fn test_hidden_leaves_leave_frame_clear() {
    let mut anim = scene(Season::Spring, desktop(), 4);
    anim.set_leaves_visible(false);
    let mut canvas = Canvas::new(anim.viewport());
    let mut clock = FixedStepClock::new(0.0, 16.0);
    drive(&mut anim, &mut clock, 10, &mut canvas, |_, _, _| {});
    assert!(canvas.frame().pixels().all(|p| p[3] == 0));
}

#[test]
fn test_paused_scene_hides_leaves_where_they_stopped() {
    let mut anim = scene(Season::Autumn, desktop(), 8);
    let mut canvas = Canvas::new(anim.viewport());
    anim.advance(0.0, &mut canvas);
    anim.advance(16.0, &mut canvas);

    anim.pause();
    let stopped: Vec<_> = anim.seasons().leaves().iter().map(|l| (l.x, l.y, l.angle)).collect();
    for i in 2..20 {
        let report = anim.advance(i as f64 * 16.0, &mut canvas);
        assert_eq!(report.dt, 16.0);
        assert_eq!(report.leaves_drawn, 0);
    }
    assert!(canvas.frame().pixels().all(|p| p[3] == 0));
    let still: Vec<_> = anim.seasons().leaves().iter().map(|l| (l.x, l.y, l.angle)).collect();
    assert_eq!(stopped, still);

    anim.resume();
    let report = anim.advance(336.0, &mut canvas);
    assert_eq!(report.dt, 16.0);
    assert_eq!(report.leaves_drawn, anim.seasons().leaves().len());
    assert!(canvas.frame().pixels().any(|p| p[3] > 0));
}
