use std::process::{Command, Stdio};
use std::sync::Arc;

use attention_signals::AlertSink;
use tracing::{debug, warn};

const ALERT_PHRASE: &str = "Alert, please focus";

/// Speaks a short prompt through the operating system's speech tool.
///
/// The child process is reaped on a detached thread so `fire` never waits
/// for playback.
#[derive(Debug, Clone)]
pub struct SpeechAlert {
    program: &'static str,
    args: Vec<String>,
}

impl SpeechAlert {
    #[cfg(target_os = "macos")]
    pub fn new() -> Self {
        Self {
            program: "say",
            args: vec![ALERT_PHRASE.to_string()],
        }
    }

    #[cfg(target_os = "windows")]
    pub fn new() -> Self {
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{ALERT_PHRASE}')"
        );
        Self {
            program: "powershell",
            args: vec!["-NoProfile".to_string(), "-Command".to_string(), script],
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    pub fn new() -> Self {
        Self {
            program: "espeak",
            args: vec![ALERT_PHRASE.to_string()],
        }
    }

    pub fn program(&self) -> &str {
        self.program
    }
}

impl Default for SpeechAlert {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for SpeechAlert {
    fn fire(&self) {
        let spawned = Command::new(self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        debug!(error = %e, "alert playback did not exit cleanly");
                    }
                });
            }
            Err(e) => warn!(program = self.program, error = %e, "failed to play alert"),
        }
    }
}

/// Writes the alert to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn fire(&self) {
        warn!("{ALERT_PHRASE}");
    }
}

/// Picks the alert sink for this machine; `silent` keeps alerts in the log.
pub fn platform_alert_sink(silent: bool) -> Arc<dyn AlertSink> {
    if silent {
        debug!("alerts will be logged only");
        Arc::new(LogAlert)
    } else {
        let sink = SpeechAlert::new();
        debug!(platform = super::get_platform(), program = sink.program(), "speech alerts enabled");
        Arc::new(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_program_for_platform() {
        let expected = match super::super::get_platform() {
            "macos" => "say",
            "windows" => "powershell",
            _ => "espeak",
        };
        assert_eq!(SpeechAlert::new().program(), expected);
    }

    #[test]
    fn test_log_alert_fires_without_side_effects() {
        let sink = platform_alert_sink(true);
        sink.fire();
        sink.fire();
    }

    #[test]
    fn test_missing_speech_program_is_not_fatal() {
        let sink = SpeechAlert {
            program: "definitely-not-an-installed-speech-tool",
            args: Vec::new(),
        };
        sink.fire();
    }
}
