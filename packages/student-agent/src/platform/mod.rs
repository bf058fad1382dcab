//! Platform-specific alert playback.

mod alert;

pub use alert::{platform_alert_sink, LogAlert, SpeechAlert};

/// Name of the platform the agent was built for.
pub fn get_platform() -> &'static str {
    #[cfg(target_os = "windows")]
    return "windows";

    #[cfg(target_os = "macos")]
    return "macos";

    #[cfg(target_os = "linux")]
    return "linux";

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    return "unknown";
}
