// Logical device provisioning
//
// One graphics queue at full priority, no optional features, no device
// extensions. Context layers are repeated at device level when diagnostics
// are on.

use ash::vk;

use super::driver::{DeviceDescriptor, Driver};
use super::error::{BootstrapError, BootstrapResult};
use super::negotiator::RequestedCapabilities;
use super::options::BootstrapOptions;
use super::selector::SelectedDevice;

const QUEUE_PRIORITY: f32 = 1.0;

impl DeviceDescriptor {
    pub fn single_queue(
        selected: &SelectedDevice,
        requested: &RequestedCapabilities,
        options: &BootstrapOptions,
    ) -> Self {
        let layers = if options.diagnostics {
            requested.layers.clone()
        } else {
            Vec::new()
        };

        Self {
            queue_family: selected.graphics_family,
            queue_priorities: vec![QUEUE_PRIORITY],
            features: vk::PhysicalDeviceFeatures::default(),
            extensions: Vec::new(),
            layers,
        }
    }
}

/// Created device plus the raw queue at (family, 0)
#[derive(Debug, Clone, Copy)]
pub struct ProvisionedDevice {
    pub device: vk::Device,
    pub queue: vk::Queue,
}

pub fn provision<D: Driver + ?Sized>(
    driver: &mut D,
    instance: vk::Instance,
    selected: &SelectedDevice,
    descriptor: &DeviceDescriptor,
) -> BootstrapResult<ProvisionedDevice> {
    let device = driver
        .create_device(instance, selected.handle, descriptor)
        .map_err(BootstrapError::DeviceCreationFailed)?;

    let queue = driver.device_queue(device, descriptor.queue_family, 0);
    log::info!(
        "Logical device created, graphics queue from family {}",
        descriptor.queue_family
    );

    Ok(ProvisionedDevice { device, queue })
}
