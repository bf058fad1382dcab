use std::time::{Duration, Instant};

use crate::status::AttentionStatus;

pub const DEFAULT_ALERT_COOLDOWN: Duration = Duration::from_secs(5);

/// Something that can get the participant's attention: a sound, speech, a
/// flashing overlay. Implementations must not block the caller for long.
pub trait AlertSink: Send + Sync {
    fn fire(&self);
}

impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    fn fire(&self) {
        (**self).fire()
    }
}

impl<T: AlertSink + ?Sized> AlertSink for Box<T> {
    fn fire(&self) {
        (**self).fire()
    }
}

/// Rate-limited gate in front of an [`AlertSink`].
///
/// Triggers that arrive during the cooldown are dropped, not queued.
pub struct AlertController<S> {
    sink: S,
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl<S: AlertSink> AlertController<S> {
    pub fn new(sink: S, cooldown: Duration) -> Self {
        Self {
            sink,
            cooldown,
            last_fired: None,
        }
    }

    /// Fires the sink if `status` needs attention and the cooldown has passed.
    /// Returns whether the sink was fired.
    pub fn evaluate(&mut self, status: AttentionStatus, now: Instant) -> bool {
        if !status.needs_attention() || !self.can_fire(now) {
            return false;
        }

        tracing::debug!(%status, "firing attention alert");
        self.sink.fire();
        self.last_fired = Some(now);
        true
    }

    fn can_fire(&self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
