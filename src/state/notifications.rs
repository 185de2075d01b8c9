use std::collections::VecDeque;

/// Lifetime of a toast in UI ticks (250 ms each).
pub const NOTIFICATION_TICKS: u32 = 20;
const MAX_NOTIFICATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    ticks_left: u32,
}

/// Transient toasts, newest last.
#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), NotificationLevel::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), NotificationLevel::Error);
    }

    fn push(&mut self, message: String, level: NotificationLevel) {
        // Collapse repeats (e.g. the refresher failing every period) into one toast.
        self.items.retain(|n| n.message != message);
        if self.items.len() == MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        self.items.push_back(Notification {
            message,
            level,
            ticks_left: NOTIFICATION_TICKS,
        });
    }

    /// Age every toast by one tick. Returns true when something expired.
    pub fn tick(&mut self) -> bool {
        let before = self.items.len();
        for n in &mut self.items {
            n.ticks_left = n.ticks_left.saturating_sub(1);
        }
        self.items.retain(|n| n.ticks_left > 0);
        self.items.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
