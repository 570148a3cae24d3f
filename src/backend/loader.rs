// Ash driver - the system Vulkan loader behind the `Driver` seam
//
// Holds the function tables for the one instance and one device the
// bootstrap creates. Raw handles passed back in are checked against them.

use ash::extensions::khr;
use ash::prelude::VkResult;
use ash::{vk, Entry};
use std::ffi::{c_char, CStr};

use super::catalog::CapabilitySet;
use super::diagnostics::DiagnosticsFilter;
use super::driver::{ContextDescriptor, DeviceDescriptor, DeviceSummary, Driver};
use super::error::BootstrapResult;
use super::surface::PresentationTarget;

/// Debug messenger entry points, looked up by name on a live instance
#[derive(Clone, Copy)]
struct DiagnosticsEntryPoints {
    create: vk::PFN_vkCreateDebugUtilsMessengerEXT,
    destroy: vk::PFN_vkDestroyDebugUtilsMessengerEXT,
}

impl DiagnosticsEntryPoints {
    /// `None` if either entry point is missing (extension not enabled)
    fn resolve(entry: &Entry, instance: vk::Instance) -> Option<Self> {
        // SAFETY: each non-null address returned for these names has the
        // signature of the matching PFN type
        unsafe {
            let create = entry.get_instance_proc_addr(
                instance,
                c"vkCreateDebugUtilsMessengerEXT".as_ptr(),
            )?;
            let destroy = entry.get_instance_proc_addr(
                instance,
                c"vkDestroyDebugUtilsMessengerEXT".as_ptr(),
            )?;
            Some(Self {
                create: std::mem::transmute::<_, vk::PFN_vkCreateDebugUtilsMessengerEXT>(create),
                destroy: std::mem::transmute::<_, vk::PFN_vkDestroyDebugUtilsMessengerEXT>(
                    destroy,
                ),
            })
        }
    }
}

pub struct AshDriver {
    device: Option<ash::Device>,
    surface_loader: Option<khr::Surface>,
    instance: Option<ash::Instance>,
    entry: Entry,
}

impl AshDriver {
    /// Load the Vulkan library
    pub fn load() -> BootstrapResult<Self> {
        let entry = unsafe { Entry::load() }?;
        Ok(Self {
            device: None,
            surface_loader: None,
            instance: None,
            entry,
        })
    }

    fn instance(&self, handle: vk::Instance) -> Option<&ash::Instance> {
        self.instance
            .as_ref()
            .filter(|instance| instance.handle() == handle)
    }

    fn device(&self, handle: vk::Device) -> Option<&ash::Device> {
        self.device.as_ref().filter(|device| device.handle() == handle)
    }
}

fn pointers(names: &[std::ffi::CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

impl Driver for AshDriver {
    fn instance_extensions(&self) -> VkResult<CapabilitySet> {
        let properties = self.entry.enumerate_instance_extension_properties(None)?;
        Ok(CapabilitySet::from_extensions(&properties))
    }

    fn instance_layers(&self) -> VkResult<CapabilitySet> {
        let properties = self.entry.enumerate_instance_layer_properties()?;
        Ok(CapabilitySet::from_layers(&properties))
    }

    fn create_context(&mut self, descriptor: &ContextDescriptor) -> VkResult<vk::Instance> {
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&descriptor.application_name)
            .application_version(descriptor.application_version)
            .engine_name(&descriptor.engine_name)
            .engine_version(descriptor.engine_version)
            .api_version(descriptor.api_version);

        let extensions = pointers(&descriptor.extensions);
        let layers = pointers(&descriptor.layers);

        let mut debug_info = descriptor.diagnostics.map(|filter| filter.create_info());

        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);
        if let Some(debug_info) = debug_info.as_mut() {
            create_info = create_info.push_next(debug_info);
        }

        let instance = unsafe { self.entry.create_instance(&create_info, None) }?;
        let handle = instance.handle();
        self.surface_loader = Some(khr::Surface::new(&self.entry, &instance));
        self.instance = Some(instance);
        Ok(handle)
    }

    fn destroy_context(&mut self, handle: vk::Instance) {
        if self.instance(handle).is_none() {
            log::warn!("destroy_context called with an unknown instance");
            return;
        }
        self.surface_loader = None;
        if let Some(instance) = self.instance.take() {
            unsafe { instance.destroy_instance(None) };
        }
    }

    fn create_diagnostics_channel(
        &mut self,
        instance: vk::Instance,
        filter: &DiagnosticsFilter,
    ) -> Option<VkResult<vk::DebugUtilsMessengerEXT>> {
        let entry_points = DiagnosticsEntryPoints::resolve(&self.entry, instance)?;
        let create_info = filter.create_info();
        let mut messenger = vk::DebugUtilsMessengerEXT::null();
        let status =
            unsafe { (entry_points.create)(instance, &create_info, std::ptr::null(), &mut messenger) };
        Some(status.result_with_success(messenger))
    }

    fn destroy_diagnostics_channel(
        &mut self,
        instance: vk::Instance,
        channel: vk::DebugUtilsMessengerEXT,
    ) -> bool {
        match DiagnosticsEntryPoints::resolve(&self.entry, instance) {
            Some(entry_points) => {
                unsafe { (entry_points.destroy)(instance, channel, std::ptr::null()) };
                true
            }
            None => false,
        }
    }

    fn create_surface(
        &mut self,
        handle: vk::Instance,
        target: &dyn PresentationTarget,
    ) -> VkResult<vk::SurfaceKHR> {
        let instance = self
            .instance(handle)
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        unsafe {
            ash_window::create_surface(
                &self.entry,
                instance,
                target.raw_display(),
                target.raw_window(),
                None,
            )
        }
    }

    fn destroy_surface(&mut self, handle: vk::Instance, surface: vk::SurfaceKHR) {
        match (self.instance(handle), self.surface_loader.as_ref()) {
            (Some(_), Some(loader)) => unsafe { loader.destroy_surface(surface, None) },
            _ => log::warn!("destroy_surface called without a live instance"),
        }
    }

    fn physical_devices(&self, handle: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        let instance = self
            .instance(handle)
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        unsafe { instance.enumerate_physical_devices() }
    }

    fn queue_families(
        &self,
        handle: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        match self.instance(handle) {
            Some(instance) => unsafe {
                instance.get_physical_device_queue_family_properties(device)
            },
            None => Vec::new(),
        }
    }

    fn describe_device(&self, handle: vk::Instance, device: vk::PhysicalDevice) -> DeviceSummary {
        let Some(instance) = self.instance(handle) else {
            return DeviceSummary {
                name: "<unknown>".to_string(),
                device_type: vk::PhysicalDeviceType::OTHER,
                api_version: 0,
            };
        };
        let properties = unsafe { instance.get_physical_device_properties(device) };
        // SAFETY: device_name is NUL-terminated per the Vulkan spec
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) };
        DeviceSummary {
            name: name.to_string_lossy().into_owned(),
            device_type: properties.device_type,
            api_version: properties.api_version,
        }
    }

    fn create_device(
        &mut self,
        handle: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VkResult<vk::Device> {
        let instance = self
            .instance(handle)
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;

        let queue_create_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(descriptor.queue_family)
            .queue_priorities(&descriptor.queue_priorities)
            .build();

        let extensions = pointers(&descriptor.extensions);
        let layers = pointers(&descriptor.layers);

        // Device layers are deprecated but older drivers still check them
        // against the instance layers
        #[allow(deprecated)]
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_create_info))
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers)
            .enabled_features(&descriptor.features);

        let device = unsafe { instance.create_device(physical_device, &create_info, None) }?;
        let raw = device.handle();
        self.device = Some(device);
        Ok(raw)
    }

    fn device_queue(&self, handle: vk::Device, family: u32, index: u32) -> vk::Queue {
        match self.device(handle) {
            Some(device) => unsafe { device.get_device_queue(family, index) },
            None => vk::Queue::null(),
        }
    }

    fn destroy_device(&mut self, handle: vk::Device) {
        if self.device(handle).is_none() {
            log::warn!("destroy_device called with an unknown device");
            return;
        }
        if let Some(device) = self.device.take() {
            unsafe {
                if let Err(status) = device.device_wait_idle() {
                    log::warn!("vkDeviceWaitIdle failed before device destruction: {:?}", status);
                }
                device.destroy_device(None);
            }
        }
    }
}
