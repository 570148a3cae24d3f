// Driver seam - the loader entry points the bootstrap sequence consumes
//
// `AshDriver` (loader.rs) is the real implementation. Handles cross this
// boundary as raw `vk` handles; the driver keeps whatever function tables it
// needs to service them.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CString;

use super::catalog::CapabilitySet;
use super::diagnostics::DiagnosticsFilter;
use super::surface::PresentationTarget;

/// Everything needed to create the top-level context
#[derive(Debug, Clone)]
pub struct ContextDescriptor {
    pub application_name: CString,
    pub application_version: u32,
    pub engine_name: CString,
    pub engine_version: u32,
    pub api_version: u32,
    pub extensions: Vec<CString>,
    pub layers: Vec<CString>,
    /// Chained into creation so context create/destroy messages are reported
    pub diagnostics: Option<DiagnosticsFilter>,
}

/// Single-queue logical device request
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    pub queue_family: u32,
    pub queue_priorities: Vec<f32>,
    pub features: vk::PhysicalDeviceFeatures,
    pub extensions: Vec<CString>,
    /// Same names as the context layers, for older drivers that check consistency
    pub layers: Vec<CString>,
}

/// Human-readable description of a physical device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
}

impl DeviceSummary {
    pub fn api_version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            vk::api_version_major(self.api_version),
            vk::api_version_minor(self.api_version),
            vk::api_version_patch(self.api_version)
        )
    }
}

pub trait Driver {
    fn instance_extensions(&self) -> VkResult<CapabilitySet>;
    fn instance_layers(&self) -> VkResult<CapabilitySet>;

    fn create_context(&mut self, descriptor: &ContextDescriptor) -> VkResult<vk::Instance>;
    fn destroy_context(&mut self, instance: vk::Instance);

    /// `None` when the entry point cannot be resolved from the context
    fn create_diagnostics_channel(
        &mut self,
        instance: vk::Instance,
        filter: &DiagnosticsFilter,
    ) -> Option<VkResult<vk::DebugUtilsMessengerEXT>>;
    /// Returns false when the destroy entry point cannot be resolved (no-op)
    fn destroy_diagnostics_channel(
        &mut self,
        instance: vk::Instance,
        channel: vk::DebugUtilsMessengerEXT,
    ) -> bool;

    fn create_surface(
        &mut self,
        instance: vk::Instance,
        target: &dyn PresentationTarget,
    ) -> VkResult<vk::SurfaceKHR>;
    fn destroy_surface(&mut self, instance: vk::Instance, surface: vk::SurfaceKHR);

    fn physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn queue_families(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;
    fn describe_device(&self, instance: vk::Instance, device: vk::PhysicalDevice)
        -> DeviceSummary;

    fn create_device(
        &mut self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VkResult<vk::Device>;
    fn device_queue(&self, device: vk::Device, family: u32, index: u32) -> vk::Queue;
    fn destroy_device(&mut self, device: vk::Device);
}
