// Release stack - acquired handles, released last-in-first-out

use ash::vk;

use super::diagnostics;
use super::driver::Driver;
use super::error::Stage;

/// A live handle owned by the bootstrap sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    Context(vk::Instance),
    Diagnostics {
        instance: vk::Instance,
        channel: vk::DebugUtilsMessengerEXT,
    },
    Surface {
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
    },
    Device(vk::Device),
}

impl Acquired {
    pub fn stage(&self) -> Stage {
        match self {
            Acquired::Context(_) => Stage::Context,
            Acquired::Diagnostics { .. } => Stage::Diagnostics,
            Acquired::Surface { .. } => Stage::Surface,
            Acquired::Device(_) => Stage::DeviceCreation,
        }
    }

    fn release<D: Driver + ?Sized>(self, driver: &mut D) {
        log::debug!("Releasing {}", self.stage());
        match self {
            Acquired::Context(instance) => driver.destroy_context(instance),
            Acquired::Diagnostics { instance, channel } => {
                diagnostics::uninstall(driver, instance, channel)
            }
            Acquired::Surface { instance, surface } => driver.destroy_surface(instance, surface),
            Acquired::Device(device) => driver.destroy_device(device),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReleaseStack {
    entries: Vec<Acquired>,
}

impl ReleaseStack {
    pub fn push(&mut self, acquired: Acquired) {
        self.entries.push(acquired);
    }

    /// Stages currently held, in construction order
    #[cfg(test)]
    pub fn stages(&self) -> Vec<Stage> {
        self.entries.iter().map(Acquired::stage).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release everything, newest first. Each entry is released once.
    pub fn unwind<D: Driver + ?Sized>(&mut self, driver: &mut D) {
        while let Some(acquired) = self.entries.pop() {
            acquired.release(driver);
        }
    }
}
