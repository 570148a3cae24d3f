// Physical device selection
//
// First-fit: the first device, in enumeration order, that exposes a graphics
// queue family wins. No scoring between discrete and integrated hardware.

use ash::vk;

use super::driver::{DeviceSummary, Driver};
use super::error::{BootstrapError, BootstrapResult, Stage};

/// The chosen GPU and its graphics queue family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDevice {
    pub handle: vk::PhysicalDevice,
    /// Position in the driver's enumeration order
    pub index: usize,
    pub graphics_family: u32,
    pub summary: DeviceSummary,
}

/// First queue family, by index, that supports graphics submission
pub fn find_graphics_family(families: &[vk::QueueFamilyProperties]) -> Option<u32> {
    families
        .iter()
        .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|index| index as u32)
}

pub fn select<D: Driver + ?Sized>(
    driver: &D,
    instance: vk::Instance,
) -> BootstrapResult<SelectedDevice> {
    let devices =
        driver
            .physical_devices(instance)
            .map_err(|status| BootstrapError::DriverQueryFailed {
                stage: Stage::DeviceSelection,
                query: "vkEnumeratePhysicalDevices",
                status,
            })?;

    if devices.is_empty() {
        return Err(BootstrapError::NoDeviceFound);
    }

    log::info!("Found {} physical device(s)", devices.len());

    for (index, &handle) in devices.iter().enumerate() {
        let summary = driver.describe_device(instance, handle);
        let families = driver.queue_families(instance, handle);

        match find_graphics_family(&families) {
            Some(graphics_family) => {
                log::info!(
                    "Selected GPU #{}: {} ({:?}, API {}), graphics family {}",
                    index,
                    summary.name,
                    summary.device_type,
                    summary.api_version_string(),
                    graphics_family
                );
                return Ok(SelectedDevice {
                    handle,
                    index,
                    graphics_family,
                    summary,
                });
            }
            None => {
                log::debug!(
                    "Skipping GPU #{} ({}): no graphics queue among {} families",
                    index,
                    summary.name,
                    families.len()
                );
            }
        }
    }

    Err(BootstrapError::NoSuitableDevice {
        examined: devices.len(),
    })
}
