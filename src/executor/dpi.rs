// Process-wide DPI awareness. Must run before the first capture or pointer
// move so that both see physical pixels.
use std::sync::Once;

static DPI_INIT: Once = Once::new();

/// Opt the process into per-monitor (v2) DPI awareness. Idempotent.
pub fn init_dpi_awareness() {
    DPI_INIT.call_once(|| {
        #[cfg(windows)]
        {
            use windows::Win32::UI::HiDpi::{
                SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
            };
            // SAFETY: plain Win32 call with a constant argument; no pointers involved.
            match unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
                Ok(()) => tracing::debug!("per-monitor DPI awareness enabled"),
                // Already set (e.g. by an application manifest) is not fatal.
                Err(e) => tracing::warn!(error = %e, "SetProcessDpiAwarenessContext failed"),
            }
        }
        #[cfg(not(windows))]
        tracing::debug!("DPI awareness setup not required on this platform");
    });
}
