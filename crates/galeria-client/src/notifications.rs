//! Transient notifications
//!
//! One notification at a time: showing a new one removes whatever is on
//! screen. A notification auto-dismisses after 6 s; any dismissal keeps it
//! present for the 400 ms slide-out before it is removed.

use galeria_core::{Clock, Severity};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const AUTO_DISMISS_AFTER: Duration = Duration::from_millis(6000);
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(400);

pub type NotificationId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
    dismissed_at: Option<Instant>,
}

impl Notification {
    /// When the slide-out begins: manual dismissal or the auto timer, whichever is first
    fn dismissal_start(&self) -> Instant {
        let auto = self.shown_at + AUTO_DISMISS_AFTER;
        match self.dismissed_at {
            Some(at) if at < auto => at,
            _ => auto,
        }
    }

    pub fn is_dismissing(&self, now: Instant) -> bool {
        now >= self.dismissal_start()
    }

    pub fn is_present(&self, now: Instant) -> bool {
        now < self.dismissal_start() + DISMISS_ANIMATION
    }
}

pub struct NotificationCenter {
    clock: Arc<dyn Clock>,
    items: Vec<Notification>,
    next_id: NotificationId,
}

impl NotificationCenter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Replace whatever is displayed with a new notification
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let id = self.next_id;
        self.next_id += 1;

        let message = message.into();
        debug!(id, ?severity, %message, "Showing notification");

        self.items.clear();
        self.items.push(Notification {
            id,
            message,
            severity,
            shown_at: self.clock.now(),
            dismissed_at: None,
        });
        id
    }

    /// Start dismissing one notification (close button). False if it is already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.prune();
        let now = self.clock.now();
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                if !n.is_dismissing(now) {
                    n.dismissed_at = Some(now);
                }
                true
            }
            None => false,
        }
    }

    /// Start dismissing everything (Escape key)
    pub fn dismiss_all(&mut self) {
        self.prune();
        let now = self.clock.now();
        for n in self.items.iter_mut().filter(|n| !n.is_dismissing(now)) {
            n.dismissed_at = Some(now);
        }
    }

    /// Notifications still on screen, sliding-out ones included
    pub fn visible(&self) -> Vec<&Notification> {
        let now = self.clock.now();
        self.items.iter().filter(|n| n.is_present(now)).collect()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.visible().into_iter().last()
    }

    pub fn is_empty(&self) -> bool {
        self.visible().is_empty()
    }

    /// Drop notifications whose slide-out has finished
    pub fn prune(&mut self) {
        let now = self.clock.now();
        self.items.retain(|n| n.is_present(now));
    }
}
