// Diagnostics bridge - debug messenger installation and the validation callback
//
// The create/destroy entry points are not exported by the loader; the driver
// resolves them from the instance at runtime.

use ash::vk;
use std::ffi::CStr;

use super::driver::Driver;
use super::error::{BootstrapError, BootstrapResult};
use super::options::BootstrapOptions;

/// Severity and category selection for the debug messenger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsFilter {
    pub severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub categories: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl DiagnosticsFilter {
    /// verbose/warning/error over general/validation/performance
    pub fn standard() -> Self {
        Self {
            severities: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            categories: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }

    pub fn create_info(&self) -> vk::DebugUtilsMessengerCreateInfoEXT {
        vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(self.severities)
            .message_type(self.categories)
            .pfn_user_callback(Some(diagnostics_callback))
            .build()
    }
}

/// Install the debug messenger when diagnostics are enabled.
///
/// Diagnostics were asked for explicitly, so an unresolvable entry point or a
/// failing create call is fatal rather than skipped.
pub fn install<D: Driver + ?Sized>(
    driver: &mut D,
    instance: vk::Instance,
    options: &BootstrapOptions,
) -> BootstrapResult<Option<vk::DebugUtilsMessengerEXT>> {
    if !options.diagnostics {
        return Ok(None);
    }

    let filter = DiagnosticsFilter::standard();
    match driver.create_diagnostics_channel(instance, &filter) {
        Some(Ok(channel)) => {
            log::info!("Debug messenger installed");
            Ok(Some(channel))
        }
        Some(Err(status)) => Err(BootstrapError::DiagnosticsBridgeUnavailable {
            reason: format!("vkCreateDebugUtilsMessengerEXT returned {:?}", status),
        }),
        None => Err(BootstrapError::DiagnosticsBridgeUnavailable {
            reason: "vkCreateDebugUtilsMessengerEXT could not be resolved".to_string(),
        }),
    }
}

/// Remove a previously installed messenger; no-op if the entry point is gone
pub fn uninstall<D: Driver + ?Sized>(
    driver: &mut D,
    instance: vk::Instance,
    channel: vk::DebugUtilsMessengerEXT,
) {
    if !driver.destroy_diagnostics_channel(instance, channel) {
        log::warn!("vkDestroyDebugUtilsMessengerEXT could not be resolved, messenger leaked");
    }
}

fn route(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

fn category_label(category: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if category.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "validation"
    } else if category.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "performance"
    } else {
        "general"
    }
}

// Never aborts the triggering call
unsafe extern "system" fn diagnostics_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message);

    log::log!(
        route(message_severity),
        "[Vulkan {}] {}",
        category_label(message_type),
        message.to_string_lossy()
    );

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Call, MockDriver, MessengerSupport};

    fn enabled() -> BootstrapOptions {
        BootstrapOptions {
            diagnostics: true,
            ..Default::default()
        }
    }

    #[test]
    fn standard_filter_selects_all_categories() {
        let filter = DiagnosticsFilter::standard();
        assert!(filter
            .severities
            .contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
        assert!(!filter
            .severities
            .contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
        assert!(filter
            .categories
            .contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE));
        let info = filter.create_info();
        assert!(info.pfn_user_callback.is_some());
        assert_eq!(info.message_type, filter.categories);
    }

    #[test]
    fn disabled_diagnostics_never_touch_the_driver() {
        let mut driver = MockDriver::default();
        let instance = vk::Handle::from_raw(1);
        let installed = install(&mut driver, instance, &BootstrapOptions::default()).unwrap();
        assert!(installed.is_none());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn unresolvable_entry_point_is_fatal_when_requested() {
        let mut driver = MockDriver {
            messenger: MessengerSupport::Unresolvable,
            ..Default::default()
        };
        let err = install(&mut driver, vk::Handle::from_raw(1), &enabled()).unwrap_err();
        assert!(matches!(err, BootstrapError::DiagnosticsBridgeUnavailable { .. }));
    }

    #[test]
    fn failing_create_is_fatal() {
        let mut driver = MockDriver {
            messenger: MessengerSupport::Failing(vk::Result::ERROR_OUT_OF_HOST_MEMORY),
            ..Default::default()
        };
        let err = install(&mut driver, vk::Handle::from_raw(1), &enabled()).unwrap_err();
        match &err {
            BootstrapError::DiagnosticsBridgeUnavailable { reason } => {
                assert_eq!(
                    reason,
                    "vkCreateDebugUtilsMessengerEXT returned ERROR_OUT_OF_HOST_MEMORY"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("ERROR_OUT_OF_HOST_MEMORY"));
    }

    #[test]
    fn installed_channel_is_recorded() {
        let mut driver = MockDriver::default();
        let channel = install(&mut driver, vk::Handle::from_raw(1), &enabled()).unwrap();
        assert!(channel.is_some());
        assert_eq!(driver.calls(), vec![Call::CreateDiagnostics]);
    }

    #[test]
    fn uninstall_without_entry_point_is_a_no_op() {
        let mut driver = MockDriver {
            messenger: MessengerSupport::Unresolvable,
            ..Default::default()
        };
        uninstall(&mut driver, vk::Handle::from_raw(1), vk::Handle::from_raw(2));
        assert_eq!(driver.calls(), vec![Call::DestroyDiagnostics { resolved: false }]);
    }

    #[test]
    fn severity_routes_to_log_levels() {
        assert_eq!(
            route(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
            log::Level::Error
        );
        assert_eq!(
            route(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING),
            log::Level::Warn
        );
        assert_eq!(
            route(vk::DebugUtilsMessageSeverityFlagsEXT::INFO),
            log::Level::Info
        );
        assert_eq!(
            route(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
            log::Level::Debug
        );
        assert_eq!(
            category_label(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION),
            "validation"
        );
    }

    #[test]
    fn callback_never_aborts() {
        let text = c"vkCreateDevice: invalid queue family";
        let data = vk::DebugUtilsMessengerCallbackDataEXT::builder()
            .message(text)
            .build();
        let verdict = unsafe {
            diagnostics_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data,
                std::ptr::null_mut(),
            )
        };
        assert_eq!(verdict, vk::FALSE);

        let verdict = unsafe {
            diagnostics_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(verdict, vk::FALSE);
    }
}
