// Extension & layer negotiation
//
// Builds the requested capability set and checks it against the catalog
// before any context exists.

use std::ffi::{CStr, CString};

use super::catalog::{self, CapabilityKind};
use super::driver::Driver;
use super::error::{BootstrapError, BootstrapResult};
use super::options::{BootstrapOptions, ExtensionPolicy};

pub const DEBUG_UTILS_EXTENSION: &CStr = c"VK_EXT_debug_utils";

/// Extensions and layers the application needs for one bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedCapabilities {
    pub extensions: Vec<CString>,
    pub layers: Vec<CString>,
}

impl RequestedCapabilities {
    /// Window-system extensions, plus debug utils and validation layers when
    /// diagnostics are on. First occurrence of a name wins.
    pub fn assemble(window_extensions: &[CString], options: &BootstrapOptions) -> Self {
        let mut requested = Self::default();
        for name in window_extensions {
            push_unique(&mut requested.extensions, name);
        }
        if options.diagnostics {
            push_unique(&mut requested.extensions, DEBUG_UTILS_EXTENSION);
            for layer in &options.validation_layers {
                push_unique(&mut requested.layers, layer);
            }
        }
        requested
    }
}

fn push_unique(names: &mut Vec<CString>, name: &CStr) {
    if !names.iter().any(|n| n.as_c_str() == name) {
        names.push(name.to_owned());
    }
}

/// Outcome of a successful negotiation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationReport {
    /// Only non-empty under the advisory policy
    pub missing_extensions: Vec<CString>,
}

impl NegotiationReport {
    pub fn all_extensions_supported(&self) -> bool {
        self.missing_extensions.is_empty()
    }
}

/// Verify the requested set against the driver's catalog.
///
/// Layers are only checked when diagnostics are enabled; without diagnostics
/// no layer is requested.
pub fn negotiate<D: Driver + ?Sized>(
    driver: &D,
    requested: &RequestedCapabilities,
    options: &BootstrapOptions,
) -> BootstrapResult<NegotiationReport> {
    if options.diagnostics {
        let layers = catalog::instance_layers(driver)?;
        catalog::log_set("Available Vulkan layers", &layers, options.verbose_logging);
        if let Some(name) = layers.missing(&requested.layers).first() {
            return Err(BootstrapError::CapabilityUnavailable {
                kind: CapabilityKind::Layer,
                name: name.to_string_lossy().into_owned(),
            });
        }
    }

    let extensions = catalog::instance_extensions(driver)?;
    catalog::log_set(
        "Available Vulkan extensions",
        &extensions,
        options.verbose_logging,
    );

    let missing: Vec<CString> = extensions
        .missing(&requested.extensions)
        .into_iter()
        .map(CStr::to_owned)
        .collect();

    for name in &requested.extensions {
        if !missing.contains(name) {
            log::debug!("\t{} supported", name.to_string_lossy());
        }
    }

    if let Some(first) = missing.first() {
        match options.extension_policy {
            ExtensionPolicy::Strict => {
                return Err(BootstrapError::CapabilityUnavailable {
                    kind: CapabilityKind::Extension,
                    name: first.to_string_lossy().into_owned(),
                });
            }
            ExtensionPolicy::Advisory => {
                for name in &missing {
                    log::warn!(
                        "Required extension {} not reported by the driver, continuing",
                        name.to_string_lossy()
                    );
                }
            }
        }
    }

    let report = NegotiationReport {
        missing_extensions: missing,
    };
    log::info!(
        "All extensions supported: {}",
        report.all_extensions_supported()
    );
    Ok(report)
}
