// Bootstrap errors
//
// Every kind is fatal: the sequence aborts and releases what it built so far.

use ash::vk;
use std::fmt;
use thiserror::Error;

use super::catalog::CapabilityKind;

/// Bootstrap stage, in construction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Loader,
    Negotiation,
    Context,
    Diagnostics,
    Surface,
    DeviceSelection,
    DeviceCreation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loader => "driver loader",
            Stage::Negotiation => "capability negotiation",
            Stage::Context => "context creation",
            Stage::Diagnostics => "diagnostics bridge",
            Stage::Surface => "surface creation",
            Stage::DeviceSelection => "device selection",
            Stage::DeviceCreation => "logical device creation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Vulkan library could not be loaded: {0}")]
    DriverUnavailable(#[from] ash::LoadingError),

    #[error("driver query `{query}` failed: {status:?}")]
    DriverQueryFailed {
        stage: Stage,
        query: &'static str,
        status: vk::Result,
    },

    #[error("required {kind} `{name}` is not available")]
    CapabilityUnavailable { kind: CapabilityKind, name: String },

    #[error("failed to create instance: {0:?}")]
    ContextCreationFailed(vk::Result),

    #[error("diagnostics were requested but the debug messenger is unavailable: {reason}")]
    DiagnosticsBridgeUnavailable { reason: String },

    #[error("failed to create window surface: {0:?}")]
    SurfaceCreationFailed(vk::Result),

    #[error("failed to find GPUs with Vulkan support")]
    NoDeviceFound,

    #[error("failed to find a suitable GPU ({examined} examined, none exposes a graphics queue family)")]
    NoSuitableDevice { examined: usize },

    #[error("failed to create logical device: {0:?}")]
    DeviceCreationFailed(vk::Result),
}

impl BootstrapError {
    /// Stage the failure belongs to
    pub fn stage(&self) -> Stage {
        match self {
            BootstrapError::DriverUnavailable(_) => Stage::Loader,
            BootstrapError::DriverQueryFailed { stage, .. } => *stage,
            BootstrapError::CapabilityUnavailable { .. } => Stage::Negotiation,
            BootstrapError::ContextCreationFailed(_) => Stage::Context,
            BootstrapError::DiagnosticsBridgeUnavailable { .. } => Stage::Diagnostics,
            BootstrapError::SurfaceCreationFailed(_) => Stage::Surface,
            BootstrapError::NoDeviceFound | BootstrapError::NoSuitableDevice { .. } => {
                Stage::DeviceSelection
            }
            BootstrapError::DeviceCreationFailed(_) => Stage::DeviceCreation,
        }
    }
}

pub type BootstrapResult<T> = std::result::Result<T, BootstrapError>;
