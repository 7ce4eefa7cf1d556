//! Seasonfall - wind-driven falling leaves and snow over a seasonal backdrop
//!
//! This library provides functionality to:
//! - Simulate leaf and snow particles under gravity, breeze noise and gusts
//! - Switch between the four seasons, each with its own population and wind
//! - Render frames in software and write them as GIF or PNG
//! - Drive the same loop from a browser through the `wasm` feature

pub mod animation;
pub mod assets;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod gif;
pub mod noise;
pub mod output;
pub mod particle;
pub mod season;
pub mod viewport;
#[cfg(feature = "wasm")]
pub mod wasm;
pub mod wind;
