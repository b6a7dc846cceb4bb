//! Settings search content monitors
//!
//! Keeps a settings search index in sync with platform state: input
//! device hotplug, package install/uninstall/enable/disable, the set of
//! installed accessibility and input-method services, and the persisted
//! keyboard settings (user dictionary, enabled input methods).
//!
//! The index and the platform are seams ([`SearchIndex`],
//! [`SettingsPlatform`]); the hosting application implements them and
//! wires real event sources to the forwarding surface on
//! [`ContentMonitors`]. Package changes are debounced by a settle delay
//! before they fan out; device and content changes apply immediately.

pub mod config;
pub mod domain;
pub mod index;
pub mod platform;
pub mod scheduler;
pub mod services;
pub mod testing;

pub use config::MonitorConfig;
pub use domain::{
    ContentKey, ContentSubscription, EnabledState, PackageEvent, PackageEventKind, SettingsScreen,
};
pub use index::SearchIndex;
pub use platform::{PlatformError, SettingsPlatform};
pub use services::ContentMonitors;
