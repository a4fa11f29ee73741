//! Traits used for signal routing portability
//!
//! Each port of the driver to other platform shall implement the trait described in this module.

use super::{PpiChannel, RoutedEvent, RoutedTask};

/// Configuration of the routes between hardware events and tasks
///
/// A route is inactive until enabled. Routes included in the self-disabling group are disabled by
/// the [`RoutedTask::GroupDisable`] task.
pub trait SignalRouting {
    /// Connect `event` to `task` using `channel`
    fn ppi_connect(&mut self, channel: PpiChannel, event: RoutedEvent, task: RoutedTask);

    /// Set or clear the second task triggered by `channel`
    fn ppi_fork(&mut self, channel: PpiChannel, task: Option<RoutedTask>);

    /// Enable `channel`
    fn ppi_enable(&mut self, channel: PpiChannel);

    /// Disable `channel`
    fn ppi_disable(&mut self, channel: PpiChannel);

    /// Include `channel` in the self-disabling group
    fn ppi_group_include(&mut self, channel: PpiChannel);

    /// Remove `channel` from the self-disabling group
    fn ppi_group_remove(&mut self, channel: PpiChannel);

    /// Clear the EGU event
    fn egu_event_clear(&mut self);

    /// Check if the EGU event was generated
    fn egu_event_check(&self) -> bool;
}
