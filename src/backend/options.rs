// Bootstrap options - explicit configuration passed into the bootstrap entry point

use serde::Deserialize;
use std::ffi::CString;

/// What to do when a required instance extension is not reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPolicy {
    /// Missing extensions abort negotiation
    #[default]
    Strict,
    /// Missing extensions are logged and context creation proceeds
    Advisory,
}

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub application_name: CString,
    /// Validation layers + debug messenger
    pub diagnostics: bool,
    /// Log full capability catalogs at info level
    pub verbose_logging: bool,
    pub extension_policy: ExtensionPolicy,
    /// Layers requested when diagnostics are enabled
    pub validation_layers: Vec<CString>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            application_name: c"Hello Triangle".to_owned(),
            diagnostics: false,
            verbose_logging: false,
            extension_policy: ExtensionPolicy::Strict,
            validation_layers: vec![c"VK_LAYER_KHRONOS_validation".to_owned()],
        }
    }
}
