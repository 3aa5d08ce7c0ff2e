use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

/// Buttons re-enable themselves if nothing finishes the operation in time
pub const LOADING_FALLBACK: Duration = Duration::from_secs(10);

pub const DEFAULT_LOADING_LABEL: &str = "Loading...";

#[derive(Debug)]
struct ButtonState {
    label: String,
    original_label: String,
    enabled: bool,
    generation: u64,
}

/// A submit button that disables itself while an operation is in flight
#[derive(Clone)]
pub struct LoadingButton {
    state: Arc<RwLock<ButtonState>>,
    fallback: Duration,
}

impl LoadingButton {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_fallback(label, LOADING_FALLBACK)
    }

    #[must_use]
    pub fn with_fallback(label: impl Into<String>, fallback: Duration) -> Self {
        let label = label.into();
        Self {
            state: Arc::new(RwLock::new(ButtonState {
                original_label: label.clone(),
                label,
                enabled: true,
                generation: 0,
            })),
            fallback,
        }
    }

    /// Disable the button and show `loading_label` until [`Self::finish`] or the fallback
    pub async fn start(&self, loading_label: Option<&str>) {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.enabled = false;
            state.label = loading_label.unwrap_or(DEFAULT_LOADING_LABEL).to_string();
            state.generation
        };

        let state = Arc::clone(&self.state);
        let fallback = self.fallback;
        tokio::spawn(async move {
            tokio::time::sleep(fallback).await;
            let mut state = state.write().await;
            if state.generation == generation && !state.enabled {
                log::debug!("Loading fallback restored button '{}'", state.original_label);
                restore(&mut state);
            }
        });
    }

    /// Restore the original label and re-enable the button
    pub async fn finish(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        restore(&mut state);
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.read().await.enabled
    }

    pub async fn label(&self) -> String {
        self.state.read().await.label.clone()
    }
}

fn restore(state: &mut ButtonState) {
    state.enabled = true;
    state.label.clone_from(&state.original_label);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_start_and_finish() {
        let button = LoadingButton::new("Sign in");
        button.start(Some("Signing in...")).await;
        assert!(!button.is_enabled().await);
        assert_eq!(button.label().await, "Signing in...");

        button.finish().await;
        assert!(button.is_enabled().await);
        assert_eq!(button.label().await, "Sign in");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_re_enables_after_ten_seconds() {
        let button = LoadingButton::new("Generate");
        button.start(None).await;
        assert_eq!(button.label().await, DEFAULT_LOADING_LABEL);

        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert!(!button.is_enabled().await);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(button.is_enabled().await);
        assert_eq!(button.label().await, "Generate");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fallback_does_not_end_a_later_operation() {
        let button = LoadingButton::new("Save");
        button.start(None).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        button.finish().await;
        button.start(None).await;

        // First fallback deadline at 10s, second at 12s
        tokio::time::sleep(Duration::from_millis(8_500)).await;
        assert!(!button.is_enabled().await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(button.is_enabled().await);
    }
}
