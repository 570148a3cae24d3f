// Backend module - Vulkan bootstrap
//
// Design: strictly linear, fail-fast stages behind a `Driver` seam
// Cleanup: every acquired handle released in reverse order on every exit path

pub mod catalog;
pub mod device;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod loader;
pub mod negotiator;
pub mod options;
pub mod provisioner;
pub mod selector;
pub mod surface;
pub mod teardown;

#[cfg(test)]
pub mod mock;

pub use device::VulkanDevice;
pub use options::{BootstrapOptions, ExtensionPolicy};
