//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the
//! application: the window, the WebGPU surface and device, and the assets the renderer
//! loads at start-up.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper for asynchronous graphics initialization
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use image::RgbaImage;
use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::LogicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::EngineConfig,
    engine_state::voxels::atlas,
    error::{EngineError, EngineResult},
};

/// Contains all graphics-related resources required by the application.
///
/// It's created once the window exists and handed to the engine, which takes
/// ownership of everything except the window handle.
pub struct Graphics {
    /// The application window
    pub window: Arc<Window>,
    /// Surface presenting to the window, already configured
    pub surface: Surface<'static>,
    /// The configuration `surface` was configured with
    pub surface_config: SurfaceConfiguration,
    /// The opened GPU device
    pub device: Device,
    /// The device's queue
    pub queue: Queue,
    /// WGSL source of the chunk shader
    pub shader_source: String,
    /// The block texture atlas
    pub atlas: RgbaImage,
}

/// Result delivered to the event loop once initialization finishes.
pub type GraphicsEvent = EngineResult<Graphics>;

/// Creates the window and surface, then returns a future that opens the device and
/// loads the assets.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
/// * `config` - Window settings and asset paths
fn create_graphics(
    event_loop: &ActiveEventLoop,
    config: &EngineConfig,
) -> EngineResult<impl Future<Output = GraphicsEvent> + 'static> {
    let window_attrs = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    let vsync = config.window.vsync;
    let shader_path = config.assets.shader_path.clone();
    let atlas_path = config.assets.atlas_path.clone();

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(EngineError::NoSurfaceFormat)?;
        let present_mode = choose_present_mode(vsync, &surface_caps.present_modes);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let shader_source =
            std::fs::read_to_string(&shader_path).map_err(|source| EngineError::Io {
                path: shader_path.clone(),
                source,
            })?;
        let atlas = atlas::load_atlas(&atlas_path)?;

        Ok::<_, EngineError>(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
            shader_source,
            atlas,
        })
    })
}

/// Picks `Fifo` for vsync, otherwise the lowest-latency mode the surface supports.
fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Helper struct for managing the asynchronous initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsEvent>>,
    config: EngineConfig,
}

/// Represents the possible states of the graphics initialization process.
///
/// This enum is used to track the current state of graphics resources
/// throughout the application's lifecycle.
pub enum MaybeGraphics {
    /// State before the first `resumed` event
    Builder(GraphicsBuilder),

    /// State after graphics resources have been handed to the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the event loop
    /// * `config` - Window settings and asset paths
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>, config: EngineConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            config,
        }
    }

    /// Builds the graphics resources and sends them to the event loop.
    ///
    /// Runs at most once; later calls do nothing. Failures are sent as the event too.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx = match create_graphics(event_loop, &self.config) {
            Ok(gfx_fut) => pollster::block_on(gfx_fut),
            Err(err) => Err(err),
        };
        if event_loop_proxy.send_event(gfx).is_err() {
            log::error!("Event loop closed before graphics were ready");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_always_uses_fifo() {
        assert_eq!(
            choose_present_mode(true, &[wgpu::PresentMode::Mailbox]),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn low_latency_modes_are_preferred_without_vsync() {
        let supported = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Mailbox,
        ];
        assert_eq!(choose_present_mode(false, &supported), wgpu::PresentMode::Mailbox);
        assert_eq!(
            choose_present_mode(false, &[wgpu::PresentMode::Fifo]),
            wgpu::PresentMode::Fifo
        );
    }
}
