//! UI glue state: search filtering, notifications, banners, loading buttons
//! and character counters
//!
//! These types hold the state a page script would keep in the DOM. Timers run
//! on Tokio and are superseded through generation counters rather than
//! cancelled handles.

pub mod counter;
pub mod filter;
pub mod loading;
pub mod notifications;

pub use counter::{CharacterCounter, CounterLevel, CounterState};
pub use filter::{matches_query, SearchFilter, SEARCH_DEBOUNCE};
pub use loading::{LoadingButton, LOADING_FALLBACK};
pub use notifications::{
    BannerKind, Notification, NotificationCenter, NotificationKind, StatusBanners,
    DEFAULT_NOTIFICATION_DURATION,
};
