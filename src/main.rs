// =============================================================================
// VULKAN BOOTSTRAP - window + driver initialisation, no rendering
// =============================================================================
//
// FLOW:
// 1. Load config.toml, initialise logging
// 2. Open a fixed-size window
// 3. Bootstrap Vulkan: negotiate capabilities, instance, debug messenger,
//    surface, physical device, logical device + graphics queue
// 4. Wait on window events until close is requested
// 5. Tear down in reverse order, device state before the window
//
// =============================================================================

mod backend;
mod config;

use anyhow::{Context, Result};
use backend::{BootstrapOptions, VulkanDevice};
use config::Config;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let (config, source) = Config::load();
    let level = config.log_level();
    init_logging(*level.as_ref().unwrap_or(&log::LevelFilter::Info));

    source.report();
    if let Err(e) = &level {
        log::warn!("{:#}, defaulting to info", e);
    }
    log::debug!("Config: {:?}", config);

    let options = config.bootstrap_options()?;
    if options.diagnostics {
        log::info!("Validation layers enabled");
    } else {
        log::info!("Validation layers disabled");
    }

    let event_loop = EventLoop::new()?;
    // Block until events arrive; nothing renders between them
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, options);
    event_loop.run_app(&mut app)?;
    app.finish()
}

/// Initialize logging; RUST_LOG overrides the configured level
fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// IMPORTANT: Field order matters for Drop! The device state owns the
/// surface, which must go before the window it was created from.
struct App {
    device: Option<VulkanDevice>,
    window: Option<Window>,
    config: Config,
    options: BootstrapOptions,
    /// First fatal error; ends the event loop
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, options: BootstrapOptions) -> Self {
        Self {
            device: None,
            window: None,
            config,
            options,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(self.config.window.resizable);

        let window = event_loop
            .create_window(attributes)
            .context("Failed to create window")?;
        log::info!(
            "Window: {}x{}",
            self.config.window.width,
            self.config.window.height
        );

        let device = VulkanDevice::new(&window, &self.options)
            .inspect_err(|e| log::error!("Bootstrap aborted during {}", e.stage()))
            .context("Vulkan initialization failed")?;

        if let Some(summary) = &device.summary {
            log::info!("Selected GPU: {}", summary.name);
            log::info!("API Version: {}", summary.api_version_string());
        }
        let queue = device.graphics_queue();
        log::info!(
            "Graphics queue {:?}: device #{}, family {}, index {}",
            queue.raw,
            queue.device_index,
            queue.family,
            queue.index
        );

        self.device = Some(device);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self) {
        // Device state first, then the window
        self.device = None;
        self.window = None;
    }

    /// Consume the app after the event loop returns
    fn finish(mut self) -> Result<()> {
        self.shutdown();
        match self.failure.take() {
            Some(err) => Err(err),
            None => {
                log::info!("Clean shutdown");
                Ok(())
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            log::error!("{:#}", err);
            self.failure = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            log::info!("Close requested");
            self.shutdown();
            event_loop.exit();
        }
    }
}
