//! Seam to the search index collaborator

use crate::domain::SettingsScreen;

/// The settings search index the monitors feed.
///
/// One shared instance exists per process; monitors hold it behind an
/// `Arc<dyn SearchIndex>`. Calls are synchronous and may block the caller
/// briefly. The index has no direct delete operation, so removals are
/// expressed as a full rebuild of the affected screen.
pub trait SearchIndex: Send + Sync + 'static {
    /// Recompute (`rebuild`) or incrementally extend the entries sourced
    /// from `screen`. `include_in_results` marks them as visible in search
    /// results.
    fn update_from_source(&self, screen: SettingsScreen, rebuild: bool, include_in_results: bool);
}
