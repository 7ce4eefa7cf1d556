//! CLI integration tests
//!
//! These tests run the seasonfall binary and check the files and output it
//! produces.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Rgba, RgbaImage};
use tempfile::TempDir;

fn seasonfall(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seasonfall"))
        .current_dir(dir)
        // Keep a config in $HOME from leaking into the test
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute seasonfall")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_snapshot_writes_png_at_device_resolution() {
    let temp = TempDir::new().unwrap();
    let output = seasonfall(
        temp.path(),
        &["snapshot", "--season", "autumn", "--seed", "1", "--frames", "10", "--dpr", "2", "-o", "shot.png"],
    );
    assert!(output.status.success(), "snapshot failed: {}", stderr(&output));

    let img = image::open(temp.path().join("shot.png")).unwrap();
    assert_eq!((img.width(), img.height()), (1920, 1080));
}

#[test]
fn test_snapshot_default_name_and_small_viewport_clamp() {
    let temp = TempDir::new().unwrap();
    let output = seasonfall(temp.path(), &["snapshot", "--season", "winter", "--width", "100", "--height", "100"]);
    assert!(output.status.success(), "snapshot failed: {}", stderr(&output));

    let img = image::open(temp.path().join("winter.png")).unwrap();
    assert_eq!((img.width(), img.height()), (320, 320));
}

#[test]
fn test_snapshot_is_deterministic_for_seed() {
    let temp = TempDir::new().unwrap();
    for name in ["a.png", "b.png"] {
        let output = seasonfall(
            temp.path(),
            &["snapshot", "--season", "spring", "--seed", "42", "--frames", "30", "--gust-at", "5", "-o", name],
        );
        assert!(output.status.success(), "snapshot failed: {}", stderr(&output));
    }
    let a = fs::read(temp.path().join("a.png")).unwrap();
    let b = fs::read(temp.path().join("b.png")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_render_writes_gif_frames() {
    let temp = TempDir::new().unwrap();
    let output = seasonfall(
        temp.path(),
        &[
            "render",
            "--season",
            "summer",
            "--seed",
            "2",
            "--frames",
            "6",
            "--width",
            "320",
            "--height",
            "320",
            "-o",
            "out/",
        ],
    );
    assert!(output.status.success(), "render failed: {}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("summer.gif"));

    let file = fs::File::open(temp.path().join("out").join("summer.gif")).unwrap();
    let frames = GifDecoder::new(std::io::BufReader::new(file)).unwrap().into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 6);
    assert_eq!(frames[0].buffer().dimensions(), (320, 320));
}

#[test]
fn test_background_image_from_assets_dir() {
    let temp = TempDir::new().unwrap();
    let bg = temp.path().join("assets/maple/tree-winter.jpg");
    fs::create_dir_all(bg.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(16, 16, Rgba([10, 20, 200, 255]))
        .save_with_format(&bg, image::ImageFormat::Png)
        .unwrap();

    let output = seasonfall(
        temp.path(),
        &["snapshot", "--season", "winter", "--frames", "1", "--seed", "3", "--no-leaves", "-o", "bg.png"],
    );
    assert!(output.status.success(), "snapshot failed: {}", stderr(&output));

    // The first frame has dt = 0; snow covers only a few pixels, so the
    // corners show the backdrop image
    let img = image::open(temp.path().join("bg.png")).unwrap().to_rgba8();
    let corners = [(0, 0), (img.width() - 1, 0), (0, img.height() - 1), (img.width() - 1, img.height() - 1)];
    // Neither the tinted accent nor white snow has a red channel this low
    let backdrop = corners.iter().filter(|(x, y)| img.get_pixel(*x, *y)[0] < 50).count();
    assert!(backdrop >= 3, "expected the blue backdrop image in the corners");
}

#[test]
fn test_config_overrides_season_table() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("seasonfall.toml"),
        "[scene]\nseason = \"spring\"\n\n[seasons.spring]\nleaf_count = 5\ntitle = \"Cherry blossoms\"\n",
    )
    .unwrap();

    let output = seasonfall(temp.path(), &["seasons", "--json"]);
    assert!(output.status.success(), "seasons failed: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["key"], "spring");
    assert_eq!(value[0]["leaf_count"], 5);
    assert_eq!(value[0]["title"], "Cherry blossoms");
    assert_eq!(value[2]["leaf_count"], 120);
}

#[test]
fn test_seasons_table_output() {
    let temp = TempDir::new().unwrap();
    let output = seasonfall(temp.path(), &["seasons"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("autumn"));
    assert!(stdout.contains("22/220"));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("seasonfall.toml"), "[seasons.autumn]\ngravity = -1.0\n").unwrap();

    let output = seasonfall(temp.path(), &["snapshot", "--season", "autumn"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("seasons.autumn.gravity"));
}

#[test]
fn test_invalid_arguments_exit_code() {
    let temp = TempDir::new().unwrap();
    let output = seasonfall(temp.path(), &["render", "--season", "monsoon"]);
    assert_eq!(output.status.code(), Some(2));

    let output = seasonfall(temp.path(), &["snapshot", "--interval", "-5"]);
    assert_eq!(output.status.code(), Some(2));
}
