//! Render and snapshot command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use image::Rgba;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{drive, AnimationLoop, FixedStepClock};
use crate::assets::AssetLibrary;
use crate::canvas::Canvas;
use crate::color::{mix, parse_color};
use crate::config::loader::{find_config, load_config, resolve_path};
use crate::config::schema::SeasonfallConfig;
use crate::gif::GifRecorder;
use crate::output::{default_output_path, save_png};
use crate::season::{Season, SeasonState};
use crate::viewport::Viewport;

use super::{SceneArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Share of white mixed into the accent for the plain backdrop.
const BACKDROP_TINT: f64 = 0.85;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Everything a command needs to run the simulation.
struct Scene {
    anim: AnimationLoop<StdRng>,
    canvas: Canvas,
    season: Season,
    interval_ms: f64,
    gust_frames: Vec<u32>,
}

/// Load config and images, then build the loop and canvas.
///
/// Errors are reported here; the caller only forwards the exit code.
fn prepare_scene(args: &SceneArgs) -> Result<Scene, ExitCode> {
    let config_path = args.config.clone().or_else(find_config);
    let config = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    let interval_ms = args.interval.unwrap_or(config.scene.frame_interval_ms);
    if !(interval_ms.is_finite() && interval_ms > 0.0) {
        eprintln!("Error: --interval must be a positive number of milliseconds, got {}", interval_ms);
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }

    let selector = args.season.unwrap_or_else(|| config.default_selector());
    let season = selector.resolve(&chrono::Local::now().date_naive());

    let viewport = Viewport::from_host(args.width as f64, args.height as f64, args.dpr)
        .with_constrained_max_width(config.scene.constrained_max_width);

    let table = config.season_table();
    let assets_dir = asset_dir(args, &config, config_path.as_deref());
    let library = AssetLibrary::load(&table, &assets_dir);

    let mut state = SeasonState::new(table, season).with_constrained_scale(config.scene.constrained_scale);
    library.install(&mut state);

    let seed = args.seed.unwrap_or_else(time_seed);
    tracing::info!(%season, seed, width = viewport.width, height = viewport.height, "starting scene");

    let mut anim = AnimationLoop::new(state, viewport, StdRng::seed_from_u64(seed))
        .with_max_frame_ms(config.scene.max_frame_ms);
    anim.set_leaves_visible(!args.no_leaves);

    let mut canvas = Canvas::new(&viewport);
    match library.season(season).background {
        Some(image) => canvas.set_backdrop_image(image),
        None => {
            let accent = parse_color(&anim.seasons().parameters().accent).unwrap_or(WHITE);
            canvas.set_backdrop_color(mix(accent, WHITE, BACKDROP_TINT));
        }
    }

    Ok(Scene { anim, canvas, season, interval_ms, gust_frames: args.gust_at.clone() })
}

/// `--assets`, then `[scene] assets_dir` relative to the config file, then
/// the current directory.
fn asset_dir(args: &SceneArgs, config: &SeasonfallConfig, config_path: Option<&Path>) -> PathBuf {
    if let Some(dir) = &args.assets {
        return dir.clone();
    }
    match (&config.scene.assets_dir, config_path) {
        (Some(dir), Some(cfg)) => resolve_path(cfg, dir),
        (Some(dir), None) => dir.clone(),
        (None, _) => PathBuf::from("."),
    }
}

fn time_seed() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
}

/// Execute the render command
pub fn run_render(args: &SceneArgs, output: Option<&Path>, loop_anim: bool) -> ExitCode {
    let mut scene = match prepare_scene(args) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let path = default_output_path(scene.season.as_str(), "gif", output);
    let mut recorder = match GifRecorder::create(&path, scene.interval_ms, loop_anim) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: Failed to create '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut clock = FixedStepClock::new(0.0, scene.interval_ms);
    let mut failure = None;
    let gust_frames = scene.gust_frames;
    drive(&mut scene.anim, &mut clock, args.frames, &mut scene.canvas, |frame, anim, canvas| {
        if failure.is_some() {
            return;
        }
        if let Err(e) = recorder.push(canvas.frame()) {
            failure = Some(e);
        }
        if gust_frames.contains(&frame) {
            anim.pointer();
        }
    });

    if let Some(e) = failure {
        eprintln!("Error: Failed to write '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    tracing::info!(path = %path.display(), frames = recorder.frames(), "wrote animation");
    println!("Saved: {}", path.display());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the snapshot command
pub fn run_snapshot(args: &SceneArgs, output: Option<&Path>) -> ExitCode {
    let mut scene = match prepare_scene(args) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut clock = FixedStepClock::new(0.0, scene.interval_ms);
    let gust_frames = scene.gust_frames;
    drive(&mut scene.anim, &mut clock, args.frames, &mut scene.canvas, |frame, anim, _| {
        if gust_frames.contains(&frame) {
            anim.pointer();
        }
    });

    let path = default_output_path(scene.season.as_str(), "png", output);
    if let Err(e) = save_png(scene.canvas.frame(), &path) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    tracing::info!(path = %path.display(), frames = args.frames, "wrote snapshot");
    println!("Saved: {}", path.display());
    ExitCode::from(EXIT_SUCCESS)
}
