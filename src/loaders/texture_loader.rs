//! Texture file loading backed by the `image` crate.

use super::LoadError;
use crate::texture::Texture2D;

/// Load and decode a texture file into a GPU texture.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &str,
) -> Result<Texture2D, LoadError> {
    let img = image::open(path).map_err(|e| LoadError::with_source(e.to_string(), path))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Texture2D::from_rgba8(
        device,
        queue,
        &rgba,
        width,
        height,
        Some(path),
    ))
}

/// Load a texture, falling back to a 1x1 white texture on failure.
/// The failure is logged and not retried.
pub fn load_texture_or_white(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &str,
) -> Texture2D {
    match load_texture(device, queue, path) {
        Ok(texture) => texture,
        Err(err) => {
            log::error!("Failed to load texture: {}", err);
            Texture2D::white(device, queue)
        }
    }
}
