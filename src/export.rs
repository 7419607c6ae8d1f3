use crate::color::Palette;
use crate::error::ExportError;
use crate::raster::{self, Layer};
use crate::settings::RenderSettings;
use crate::simulation::DlaSimulation;
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Directory used when no export path is given
pub fn default_export_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `dla-<unix seconds>.png` inside `dir`
pub fn default_export_path(dir: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    dir.join(format!("dla-{}.png", secs))
}

/// Render the current visual state and write it as a PNG.
/// `scale` is pixels per simulation unit.
pub fn export_png(
    simulation: &DlaSimulation,
    render: &RenderSettings,
    path: &Path,
    scale: f32,
) -> Result<PathBuf, ExportError> {
    let edges = simulation.edges();
    let width = (edges.width() * scale).round() as u32;
    let height = (edges.height() * scale).round() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyImage(width, height));
    }

    let canvas = raster::rasterize(simulation, render, width as usize, height as usize);
    let palette = Palette::from_settings(render);
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let rgba = match canvas.get(x as usize, y as usize) {
            None => palette.background,
            Some(Layer::Walker) => palette.walker,
            Some(Layer::Shape) => palette.shape,
            Some(Layer::Cluster) => palette.cluster,
            Some(Layer::Line) => palette.line,
        };
        Rgba(rgba)
    });

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    image.save_with_format(path, image::ImageFormat::Png)?;

    info!(path = %path.display(), width, height, "Exported PNG");
    Ok(path.to_path_buf())
}
