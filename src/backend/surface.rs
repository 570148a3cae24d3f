// Presentation target - the window-system side of surface creation

use ash::prelude::VkResult;
use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use std::ffi::{CStr, CString};

/// A window the driver can present to
pub trait PresentationTarget {
    /// Instance extensions the window system needs for surface creation
    fn required_extensions(&self) -> VkResult<Vec<CString>>;
    fn raw_display(&self) -> RawDisplayHandle;
    fn raw_window(&self) -> RawWindowHandle;
}

impl PresentationTarget for winit::window::Window {
    fn required_extensions(&self) -> VkResult<Vec<CString>> {
        let names = ash_window::enumerate_required_extensions(self.raw_display_handle())?;
        Ok(names
            .iter()
            // SAFETY: ash-window hands out pointers to static NUL-terminated names
            .map(|&ptr| unsafe { CStr::from_ptr(ptr) }.to_owned())
            .collect())
    }

    fn raw_display(&self) -> RawDisplayHandle {
        self.raw_display_handle()
    }

    fn raw_window(&self) -> RawWindowHandle {
        self.raw_window_handle()
    }
}
