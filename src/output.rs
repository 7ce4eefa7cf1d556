//! PNG output and frame file naming

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Create the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save a frame as PNG, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Default output path for a rendered season, e.g. `autumn.gif`.
///
/// With `output_arg` naming a directory (trailing separator or an existing
/// directory) the file goes inside it; any other `output_arg` is used as is.
pub fn default_output_path(season: &str, extension: &str, output_arg: Option<&Path>) -> PathBuf {
    let file_name = format!("{}.{}", season, extension);
    match output_arg {
        None => PathBuf::from(file_name),
        Some(out) => {
            let as_str = out.to_string_lossy();
            if as_str.ends_with('/') || as_str.ends_with(std::path::MAIN_SEPARATOR) || out.is_dir() {
                out.join(file_name)
            } else {
                out.to_path_buf()
            }
        }
    }
}
