// Capability catalog - what the driver reports as available
//
// Sets are re-queried on every call; nothing here is cached.

use ash::vk;
use std::ffi::{CStr, CString};
use std::fmt;

use super::driver::Driver;
use super::error::{BootstrapError, BootstrapResult, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Extension,
    Layer,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Extension => f.write_str("extension"),
            CapabilityKind::Layer => f.write_str("layer"),
        }
    }
}

/// A named extension or layer with its spec version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub name: CString,
    pub version: u32,
}

impl Capability {
    pub fn new(name: &CStr, version: u32) -> Self {
        Self {
            name: name.to_owned(),
            version,
        }
    }
}

/// Ordered list of capabilities, in driver report order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<Capability>,
}

impl CapabilitySet {
    #[cfg(test)]
    pub fn new(entries: Vec<Capability>) -> Self {
        Self { entries }
    }

    pub fn from_extensions(properties: &[vk::ExtensionProperties]) -> Self {
        let entries = properties
            .iter()
            .map(|p| {
                // SAFETY: the driver fills extension_name with a NUL-terminated string
                let name = unsafe { CStr::from_ptr(p.extension_name.as_ptr()) };
                Capability::new(name, p.spec_version)
            })
            .collect();
        Self { entries }
    }

    pub fn from_layers(properties: &[vk::LayerProperties]) -> Self {
        let entries = properties
            .iter()
            .map(|p| {
                // SAFETY: the driver fills layer_name with a NUL-terminated string
                let name = unsafe { CStr::from_ptr(p.layer_name.as_ptr()) };
                Capability::new(name, p.spec_version)
            })
            .collect();
        Self { entries }
    }

    /// Exact, case-sensitive name match
    pub fn contains(&self, name: &CStr) -> bool {
        self.entries.iter().any(|c| c.name.as_c_str() == name)
    }

    /// Names from `wanted` that this set does not contain, in request order
    pub fn missing<'a>(&self, wanted: &'a [CString]) -> Vec<&'a CStr> {
        wanted
            .iter()
            .map(CString::as_c_str)
            .filter(|name| !self.contains(name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Query the driver's instance extensions
pub fn instance_extensions<D: Driver + ?Sized>(driver: &D) -> BootstrapResult<CapabilitySet> {
    driver
        .instance_extensions()
        .map_err(|status| BootstrapError::DriverQueryFailed {
            stage: Stage::Negotiation,
            query: "vkEnumerateInstanceExtensionProperties",
            status,
        })
}

/// Query the driver's instance layers
pub fn instance_layers<D: Driver + ?Sized>(driver: &D) -> BootstrapResult<CapabilitySet> {
    driver
        .instance_layers()
        .map_err(|status| BootstrapError::DriverQueryFailed {
            stage: Stage::Negotiation,
            query: "vkEnumerateInstanceLayerProperties",
            status,
        })
}

/// Log every entry of a set, at info level when verbose
pub fn log_set(title: &str, set: &CapabilitySet, verbose: bool) {
    let level = if verbose {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    log::log!(level, "{} ({}):", title, set.len());
    for capability in set.iter() {
        log::log!(
            level,
            "\t{} (v{})",
            capability.name.to_string_lossy(),
            capability.version
        );
    }
}
