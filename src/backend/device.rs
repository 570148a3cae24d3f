// Vulkan Device - bootstrap sequence from driver entry point to graphics queue
//
// Responsibilities:
// - Capability negotiation (extensions, validation layers)
// - Instance creation + debug messenger
// - Window surface
// - Physical device selection (first fit)
// - Logical device + queue creation
//
// Each stage consumes the previous one's output. Every handle is pushed on the
// release stack as soon as it exists, so an early return tears down exactly
// what was built, newest first.

use ash::vk;
use std::marker::PhantomData;

use super::diagnostics::{self, DiagnosticsFilter};
use super::driver::{ContextDescriptor, DeviceDescriptor, DeviceSummary, Driver};
use super::error::{BootstrapError, BootstrapResult};
use super::loader::AshDriver;
use super::negotiator::{self, NegotiationReport, RequestedCapabilities};
use super::options::BootstrapOptions;
use super::provisioner;
use super::selector::{self, SelectedDevice};
use super::surface::PresentationTarget;
use super::teardown::{Acquired, ReleaseStack};

const ENGINE_NAME: &std::ffi::CStr = c"No Engine";

/// Non-owning view of the graphics queue, valid while the device lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueHandle<'a> {
    pub raw: vk::Queue,
    /// Enumeration index of the physical device the queue belongs to
    pub device_index: usize,
    pub family: u32,
    pub index: u32,
    _device: PhantomData<&'a vk::Device>,
}

/// Fully bootstrapped driver state with automatic cleanup
pub struct VulkanDevice<D: Driver = AshDriver> {
    releases: ReleaseStack,
    driver: D,

    pub instance: vk::Instance,
    pub debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    pub surface: vk::SurfaceKHR,
    pub physical_device: vk::PhysicalDevice,
    pub physical_device_index: usize,
    pub graphics_queue_family: u32,
    pub device: vk::Device,
    graphics_queue: vk::Queue,

    pub summary: Option<DeviceSummary>,
    pub negotiation: NegotiationReport,
}

impl VulkanDevice<AshDriver> {
    /// Load the system Vulkan library and bootstrap against it
    pub fn new(
        target: &dyn PresentationTarget,
        options: &BootstrapOptions,
    ) -> BootstrapResult<Self> {
        let driver = AshDriver::load()?;
        Self::bootstrap(driver, target, options)
    }
}

impl<D: Driver> VulkanDevice<D> {
    fn unstarted(driver: D) -> Self {
        Self {
            releases: ReleaseStack::default(),
            driver,
            instance: vk::Instance::null(),
            debug_messenger: None,
            surface: vk::SurfaceKHR::null(),
            physical_device: vk::PhysicalDevice::null(),
            physical_device_index: 0,
            graphics_queue_family: 0,
            device: vk::Device::null(),
            graphics_queue: vk::Queue::null(),
            summary: None,
            negotiation: NegotiationReport::default(),
        }
    }

    /// Run the whole sequence. Either everything is live or nothing is.
    pub fn bootstrap(
        driver: D,
        target: &dyn PresentationTarget,
        options: &BootstrapOptions,
    ) -> BootstrapResult<Self> {
        log::info!(
            "Bootstrapping Vulkan for {:?} (diagnostics {})",
            options.application_name,
            if options.diagnostics { "on" } else { "off" }
        );

        // Dropping `this` on any early return unwinds the release stack
        let mut this = Self::unstarted(driver);

        // Step 1: Negotiate extensions and layers
        let window_extensions = target
            .required_extensions()
            .map_err(BootstrapError::SurfaceCreationFailed)?;
        let requested = RequestedCapabilities::assemble(&window_extensions, options);
        this.negotiation = negotiator::negotiate(&this.driver, &requested, options)?;

        // Step 2: Create instance
        let descriptor = ContextDescriptor::for_application(options, &requested);
        this.instance = this
            .driver
            .create_context(&descriptor)
            .map_err(BootstrapError::ContextCreationFailed)?;
        this.releases.push(Acquired::Context(this.instance));
        log::info!("Instance created");

        // Step 3: Debug messenger
        if let Some(channel) = diagnostics::install(&mut this.driver, this.instance, options)? {
            this.debug_messenger = Some(channel);
            this.releases.push(Acquired::Diagnostics {
                instance: this.instance,
                channel,
            });
        }

        // Step 4: Surface
        this.surface = this
            .driver
            .create_surface(this.instance, target)
            .map_err(BootstrapError::SurfaceCreationFailed)?;
        this.releases.push(Acquired::Surface {
            instance: this.instance,
            surface: this.surface,
        });
        log::info!("Window surface created");

        // Step 5: Pick physical device
        let selected = selector::select(&this.driver, this.instance)?;

        // Step 6: Logical device + graphics queue
        let device_descriptor = DeviceDescriptor::single_queue(&selected, &requested, options);
        let provisioned = provisioner::provision(
            &mut this.driver,
            this.instance,
            &selected,
            &device_descriptor,
        )?;
        this.releases.push(Acquired::Device(provisioned.device));

        let SelectedDevice {
            handle,
            index,
            graphics_family,
            summary,
        } = selected;
        this.physical_device = handle;
        this.physical_device_index = index;
        this.graphics_queue_family = graphics_family;
        this.device = provisioned.device;
        this.graphics_queue = provisioned.queue;
        this.summary = Some(summary);

        log::info!("Vulkan initialized successfully!");
        Ok(this)
    }

    pub fn graphics_queue(&self) -> QueueHandle<'_> {
        QueueHandle {
            raw: self.graphics_queue,
            device_index: self.physical_device_index,
            family: self.graphics_queue_family,
            index: 0,
            _device: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: Driver> Drop for VulkanDevice<D> {
    fn drop(&mut self) {
        if self.releases.is_empty() {
            return;
        }
        log::info!("Destroying Vulkan device...");
        self.releases.unwind(&mut self.driver);
    }
}

impl ContextDescriptor {
    pub fn for_application(options: &BootstrapOptions, requested: &RequestedCapabilities) -> Self {
        Self {
            application_name: options.application_name.clone(),
            application_version: vk::make_api_version(0, 1, 0, 0),
            engine_name: ENGINE_NAME.to_owned(),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::API_VERSION_1_0,
            extensions: requested.extensions.clone(),
            layers: requested.layers.clone(),
            diagnostics: options.diagnostics.then(DiagnosticsFilter::standard),
        }
    }
}
