use std::time::{Duration, Instant};

pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Single-slot transient message surface. A new message replaces the one
/// on screen and restarts the dismiss timer.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    slot: Option<Notice>,
    posted: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::debug!(%message, "notice posted");
        self.slot = Some(Notice {
            message,
            expires_at: now + NOTICE_DURATION,
        });
        self.posted += 1;
    }

    pub fn current(&self, now: Instant) -> Option<&str> {
        self.slot
            .as_ref()
            .filter(|notice| now < notice.expires_at)
            .map(|notice| notice.message.as_str())
    }

    /// Drops an expired message. Returns true when something was dismissed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.slot.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.slot = None;
            return true;
        }
        false
    }

    /// Total number of messages ever posted.
    pub fn posted(&self) -> u64 {
        self.posted
    }
}
