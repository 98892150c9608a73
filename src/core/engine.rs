//! Main engine entry point.

use super::{Clock, Context, ContextError, RenderConfig, Renderer};
use crate::camera::PerspectiveCamera;
use crate::scene::Scene;

/// The main Ember engine.
/// Manages the rendering context, renderer, and timing.
pub struct Engine {
    /// The wgpu context.
    pub context: Context,
    /// The renderer.
    pub renderer: Renderer,
    /// The clock for timing.
    pub clock: Clock,
}

impl Engine {
    /// Create a new engine from a window handle.
    ///
    /// # Arguments
    /// * `window` - A window handle (anything convertible into a wgpu surface target)
    /// * `width` - Initial width in pixels
    /// * `height` - Initial height in pixels
    ///
    /// # Safety
    /// The window must outlive the engine.
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        Self::with_config(window, width, height, RenderConfig::default()).await
    }

    /// Create a new engine with custom configuration.
    pub async fn with_config<W>(
        window: W,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let context = Context::new(window, width, height, &config).await?;
        let renderer = Renderer::new(&context, config);
        let clock = Clock::start_new();

        Ok(Self {
            context,
            renderer,
            clock,
        })
    }

    /// Handle resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width != self.context.width || height != self.context.height)
        {
            self.context.resize(width, height);
            self.renderer.resize(&self.context);
        }
    }

    /// Get current width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.context.width
    }

    /// Get current height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.context.height
    }

    /// Get aspect ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    /// Get delta time since last frame.
    pub fn delta_time(&mut self) -> f32 {
        self.clock.get_delta() as f32
    }

    /// Get elapsed time since engine start.
    pub fn elapsed_time(&mut self) -> f32 {
        self.clock.get_elapsed_time() as f32
    }

    /// Get the device.
    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    /// Get the queue.
    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    /// Render a full frame of the given scene.
    pub fn render_scene(
        &mut self,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        delta_time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.renderer
            .render(&self.context, scene, camera, delta_time)
    }

    /// Render a full frame, giving `overlay` a chance to record UI
    /// draws onto the final surface before presentation.
    pub fn render_scene_with_overlay<F>(
        &mut self,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        delta_time: f32,
        overlay: F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.renderer
            .render_with_overlay(&self.context, scene, camera, delta_time, overlay)
    }
}

/// Builder for configuring the engine.
pub struct EngineBuilder {
    config: RenderConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Create a new engine builder.
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }

    /// Set power preference.
    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.config.power_preference = preference;
        self
    }

    /// Set present mode.
    pub fn present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.config.present_mode = mode;
        self
    }

    /// Set shadow map resolution.
    pub fn shadow_resolution(mut self, resolution: u32) -> Self {
        self.config.shadow_resolution = resolution;
        self
    }

    /// Build the engine.
    pub async fn build<W>(self, window: W, width: u32, height: u32) -> Result<Engine, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        Engine::with_config(window, width, height, self.config).await
    }
}
