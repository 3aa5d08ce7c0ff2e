//! Transient notifications and status banners

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::identity::AuthResult;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(300);
pub const BANNER_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    /// Set while the dismiss animation runs
    pub dismissing: bool,
}

/// Stack of dismissible toasts, ordered by insertion
#[derive(Clone, Default)]
pub struct NotificationCenter {
    stack: Arc<RwLock<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notification for the default duration
    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notify_for(message, kind, DEFAULT_NOTIFICATION_DURATION)
            .await
    }

    /// Show a notification and remove it once `duration` has elapsed
    pub async fn notify_for(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.stack.write().await.push(Notification {
            id,
            message: message.into(),
            kind,
            dismissing: false,
        });

        let stack = Arc::clone(&self.stack);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            dismiss_from(&stack, id).await;
        });
        id
    }

    /// Dismiss a notification before its timer runs out
    pub async fn dismiss(&self, id: u64) {
        dismiss_from(&self.stack, id).await;
    }

    /// Notifications currently in the document, oldest first
    pub async fn active(&self) -> Vec<Notification> {
        self.stack.read().await.clone()
    }
}

async fn dismiss_from(stack: &RwLock<Vec<Notification>>, id: u64) {
    {
        let mut stack = stack.write().await;
        match stack.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.dismissing => notification.dismissing = true,
            // Already gone or already on its way out
            _ => return,
        }
    }
    tokio::time::sleep(DISMISS_ANIMATION).await;
    stack.write().await.retain(|n| n.id != id);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

#[derive(Default)]
struct BannerSlot {
    message: Option<String>,
    generation: u64,
}

/// Separate error and success banners, each auto-hiding after 5000 ms
///
/// Showing a message replaces whatever the banner held and restarts its timer.
#[derive(Clone)]
pub struct StatusBanners {
    error: Arc<RwLock<BannerSlot>>,
    success: Arc<RwLock<BannerSlot>>,
    duration: Duration,
}

impl Default for StatusBanners {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBanners {
    #[must_use]
    pub fn new() -> Self {
        Self::with_duration(BANNER_DURATION)
    }

    #[must_use]
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            error: Arc::new(RwLock::new(BannerSlot::default())),
            success: Arc::new(RwLock::new(BannerSlot::default())),
            duration,
        }
    }

    fn slot(&self, kind: BannerKind) -> &Arc<RwLock<BannerSlot>> {
        match kind {
            BannerKind::Error => &self.error,
            BannerKind::Success => &self.success,
        }
    }

    pub async fn show(&self, kind: BannerKind, message: impl Into<String>) {
        let slot = Arc::clone(self.slot(kind));
        let generation = {
            let mut guard = slot.write().await;
            guard.generation += 1;
            guard.message = Some(message.into());
            guard.generation
        };

        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut guard = slot.write().await;
            if guard.generation == generation {
                guard.message = None;
            }
        });
    }

    pub async fn show_error(&self, message: impl Into<String>) {
        self.show(BannerKind::Error, message).await;
    }

    pub async fn show_success(&self, message: impl Into<String>) {
        self.show(BannerKind::Success, message).await;
    }

    /// Route an auth outcome to the matching banner
    pub async fn render(&self, result: &AuthResult) {
        let message = result.message.clone().unwrap_or_default();
        if result.success {
            self.hide(BannerKind::Error).await;
            self.show_success(message).await;
        } else {
            self.hide(BannerKind::Success).await;
            self.show_error(message).await;
        }
    }

    pub async fn hide(&self, kind: BannerKind) {
        let mut guard = self.slot(kind).write().await;
        guard.generation += 1;
        guard.message = None;
    }

    pub async fn message(&self, kind: BannerKind) -> Option<String> {
        self.slot(kind).read().await.message.clone()
    }
}
