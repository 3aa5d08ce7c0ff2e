use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

/// Quiet period before a query is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// One filterable element, kept in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTarget {
    pub text: String,
    pub visible: bool,
}

/// Case-insensitive substring match; an empty query matches everything
#[must_use]
pub fn matches_query(text: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

/// Debounced search filter over a fixed set of targets
///
/// Each call to [`SearchFilter::set_query`] supersedes the previous one; only
/// the last query issued within the debounce window is applied.
pub struct SearchFilter {
    targets: Arc<RwLock<Vec<FilterTarget>>>,
    generation: Arc<AtomicU64>,
    delay: Duration,
}

impl SearchFilter {
    #[must_use]
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_delay(texts, SEARCH_DEBOUNCE)
    }

    #[must_use]
    pub fn with_delay<I, S>(texts: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = texts
            .into_iter()
            .map(|text| FilterTarget {
                text: text.into(),
                visible: true,
            })
            .collect();
        Self {
            targets: Arc::new(RwLock::new(targets)),
            generation: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    /// Schedule `query` to be applied after the debounce window
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let targets = Arc::clone(&self.targets);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            apply_query(&mut targets.write().await, &query);
        });
    }

    /// Texts of the currently visible targets, in document order
    pub async fn visible(&self) -> Vec<String> {
        self.targets
            .read()
            .await
            .iter()
            .filter(|target| target.visible)
            .map(|target| target.text.clone())
            .collect()
    }

    pub async fn targets(&self) -> Vec<FilterTarget> {
        self.targets.read().await.clone()
    }
}

fn apply_query(targets: &mut [FilterTarget], query: &str) {
    for target in targets {
        target.visible = matches_query(&target.text, query);
    }
}
