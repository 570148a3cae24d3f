// Recording in-memory driver for tests

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use std::cell::RefCell;
use std::ffi::CString;
use std::rc::Rc;

use super::catalog::{Capability, CapabilitySet};
use super::diagnostics::DiagnosticsFilter;
use super::driver::{ContextDescriptor, DeviceDescriptor, DeviceSummary, Driver};
use super::surface::PresentationTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    EnumerateExtensions,
    EnumerateLayers,
    CreateContext,
    DestroyContext,
    CreateDiagnostics,
    DestroyDiagnostics { resolved: bool },
    CreateSurface,
    DestroySurface,
    EnumerateDevices,
    DescribeDevice { device: usize },
    QueueFamilies { device: usize },
    CreateDevice { device: usize, family: u32 },
    DeviceQueue { family: u32, index: u32 },
    DestroyDevice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessengerSupport {
    Resolvable,
    Unresolvable,
    Failing(vk::Result),
}

pub struct MockDriver {
    pub extensions: Vec<&'static str>,
    pub layers: Vec<&'static str>,
    /// One entry per physical device, one flag set per queue family
    pub devices: Vec<Vec<vk::QueueFlags>>,
    pub messenger: MessengerSupport,
    pub context_status: Option<vk::Result>,
    pub surface_status: Option<vk::Result>,
    pub device_status: Option<vk::Result>,
    pub extensions_status: Option<vk::Result>,
    pub layers_status: Option<vk::Result>,
    pub devices_status: Option<vk::Result>,
    pub last_context: Option<ContextDescriptor>,
    pub last_device: Option<DeviceDescriptor>,
    pub(crate) journal: Rc<RefCell<Vec<Call>>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            extensions: vec!["VK_KHR_surface", "VK_KHR_xlib_surface", "VK_EXT_debug_utils"],
            layers: vec!["VK_LAYER_KHRONOS_validation"],
            devices: vec![vec![
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            ]],
            messenger: MessengerSupport::Resolvable,
            context_status: None,
            surface_status: None,
            device_status: None,
            extensions_status: None,
            layers_status: None,
            devices_status: None,
            last_context: None,
            last_device: None,
            journal: Rc::default(),
        }
    }
}

impl MockDriver {
    pub const INSTANCE: u64 = 0x10;
    pub const MESSENGER: u64 = 0x20;
    pub const SURFACE: u64 = 0x30;
    pub const DEVICE: u64 = 0x40;
    const PHYSICAL_BASE: u64 = 0x100;
    const QUEUE_BASE: u64 = 0x1000;

    pub fn physical_device(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(Self::PHYSICAL_BASE + index as u64)
    }

    pub fn queue(family: u32, index: u32) -> vk::Queue {
        vk::Queue::from_raw(Self::QUEUE_BASE + u64::from(family) * 16 + u64::from(index))
    }

    fn physical_index(device: vk::PhysicalDevice) -> usize {
        (device.as_raw() - Self::PHYSICAL_BASE) as usize
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.journal.borrow().iter().filter(|c| *c == call).count()
    }

    /// Shared journal, readable after the driver has been moved or dropped
    pub fn journal_handle(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.journal)
    }

    fn set(names: &[&str]) -> CapabilitySet {
        CapabilitySet::new(
            names
                .iter()
                .map(|n| Capability {
                    name: CString::new(*n).expect("test names have no NUL"),
                    version: 1,
                })
                .collect(),
        )
    }
}

impl Driver for MockDriver {
    fn instance_extensions(&self) -> VkResult<CapabilitySet> {
        self.record(Call::EnumerateExtensions);
        if let Some(status) = self.extensions_status {
            return Err(status);
        }
        Ok(Self::set(&self.extensions))
    }

    fn instance_layers(&self) -> VkResult<CapabilitySet> {
        self.record(Call::EnumerateLayers);
        if let Some(status) = self.layers_status {
            return Err(status);
        }
        Ok(Self::set(&self.layers))
    }

    fn create_context(&mut self, descriptor: &ContextDescriptor) -> VkResult<vk::Instance> {
        self.record(Call::CreateContext);
        self.last_context = Some(descriptor.clone());
        match self.context_status {
            Some(status) => Err(status),
            None => Ok(vk::Instance::from_raw(Self::INSTANCE)),
        }
    }

    fn destroy_context(&mut self, _instance: vk::Instance) {
        self.record(Call::DestroyContext);
    }

    fn create_diagnostics_channel(
        &mut self,
        _instance: vk::Instance,
        _filter: &DiagnosticsFilter,
    ) -> Option<VkResult<vk::DebugUtilsMessengerEXT>> {
        match self.messenger {
            MessengerSupport::Unresolvable => None,
            MessengerSupport::Failing(status) => {
                self.record(Call::CreateDiagnostics);
                Some(Err(status))
            }
            MessengerSupport::Resolvable => {
                self.record(Call::CreateDiagnostics);
                Some(Ok(vk::DebugUtilsMessengerEXT::from_raw(Self::MESSENGER)))
            }
        }
    }

    fn destroy_diagnostics_channel(
        &mut self,
        _instance: vk::Instance,
        _channel: vk::DebugUtilsMessengerEXT,
    ) -> bool {
        let resolved = self.messenger != MessengerSupport::Unresolvable;
        self.record(Call::DestroyDiagnostics { resolved });
        resolved
    }

    fn create_surface(
        &mut self,
        _instance: vk::Instance,
        _target: &dyn PresentationTarget,
    ) -> VkResult<vk::SurfaceKHR> {
        self.record(Call::CreateSurface);
        match self.surface_status {
            Some(status) => Err(status),
            None => Ok(vk::SurfaceKHR::from_raw(Self::SURFACE)),
        }
    }

    fn destroy_surface(&mut self, _instance: vk::Instance, _surface: vk::SurfaceKHR) {
        self.record(Call::DestroySurface);
    }

    fn physical_devices(&self, _instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.record(Call::EnumerateDevices);
        if let Some(status) = self.devices_status {
            return Err(status);
        }
        Ok((0..self.devices.len()).map(Self::physical_device).collect())
    }

    fn queue_families(
        &self,
        _instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        let index = Self::physical_index(device);
        self.record(Call::QueueFamilies { device: index });
        self.devices[index]
            .iter()
            .map(|&flags| vk::QueueFamilyProperties {
                queue_flags: flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect()
    }

    fn describe_device(&self, _instance: vk::Instance, device: vk::PhysicalDevice) -> DeviceSummary {
        let index = Self::physical_index(device);
        self.record(Call::DescribeDevice { device: index });
        DeviceSummary {
            name: format!("Mock GPU {}", index),
            device_type: vk::PhysicalDeviceType::INTEGRATED_GPU,
            api_version: vk::API_VERSION_1_0,
        }
    }

    fn create_device(
        &mut self,
        _instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VkResult<vk::Device> {
        self.record(Call::CreateDevice {
            device: Self::physical_index(physical_device),
            family: descriptor.queue_family,
        });
        self.last_device = Some(descriptor.clone());
        match self.device_status {
            Some(status) => Err(status),
            None => Ok(vk::Device::from_raw(Self::DEVICE)),
        }
    }

    fn device_queue(&self, _device: vk::Device, family: u32, index: u32) -> vk::Queue {
        self.record(Call::DeviceQueue { family, index });
        Self::queue(family, index)
    }

    fn destroy_device(&mut self, _device: vk::Device) {
        self.record(Call::DestroyDevice);
    }
}

/// Window stand-in with an Xlib-flavoured extension list
pub struct FakeWindow {
    pub extensions: Vec<CString>,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self {
            extensions: vec![
                c"VK_KHR_surface".to_owned(),
                c"VK_KHR_xlib_surface".to_owned(),
            ],
        }
    }
}

impl PresentationTarget for FakeWindow {
    fn required_extensions(&self) -> VkResult<Vec<CString>> {
        Ok(self.extensions.clone())
    }

    fn raw_display(&self) -> RawDisplayHandle {
        RawDisplayHandle::Xlib(XlibDisplayHandle::empty())
    }

    fn raw_window(&self) -> RawWindowHandle {
        RawWindowHandle::Xlib(XlibWindowHandle::empty())
    }
}
