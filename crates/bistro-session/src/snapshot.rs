//! # Snapshot Slots
//!
//! Latest-wins holders for fetched catalog data.
//!
//! ## Refresh Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  refresh A ── begin() → ticket 1 ──── fetch … slow … ──► install(1) ✗   │
//! │  refresh B ── begin() → ticket 2 ── fetch ──► install(2) ✓              │
//! │                                                                         │
//! │  A finished last but started first: its result is stale and dropped    │
//! │  (RefreshOutcome::Superseded). The slot keeps B's snapshot.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the most recently started refresh may install. A refresh that fails
//! installs nothing, so the previous snapshot stays readable.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Generation ticket handed out by [`SnapshotSlot::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a fetched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The value is now the current snapshot.
    Installed,
    /// A newer refresh was started meanwhile; the value was dropped.
    Superseded,
}

#[derive(Debug)]
struct SlotState<T> {
    latest_ticket: u64,
    installed_ticket: u64,
    value: Option<Arc<T>>,
}

/// Holds the current snapshot of one kind of fetched data.
#[derive(Debug)]
pub struct SnapshotSlot<T> {
    state: RwLock<SlotState<T>>,
}

impl<T> Default for SnapshotSlot<T> {
    fn default() -> Self {
        SnapshotSlot {
            state: RwLock::new(SlotState {
                latest_ticket: 0,
                installed_ticket: 0,
                value: None,
            }),
        }
    }
}

impl<T> SnapshotSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh. Any refresh started earlier can no longer install.
    pub async fn begin(&self) -> Ticket {
        let mut state = self.state.write().await;
        state.latest_ticket += 1;
        Ticket(state.latest_ticket)
    }

    /// Installs a fetched value if its refresh is still the latest.
    pub async fn install(&self, ticket: Ticket, value: T) -> RefreshOutcome {
        let mut state = self.state.write().await;
        if ticket.0 != state.latest_ticket {
            return RefreshOutcome::Superseded;
        }
        state.installed_ticket = ticket.0;
        state.value = Some(Arc::new(value));
        RefreshOutcome::Installed
    }

    /// Whether `ticket` belongs to the most recently started refresh.
    pub async fn is_latest(&self, ticket: Ticket) -> bool {
        self.state.read().await.latest_ticket == ticket.0
    }

    /// The current snapshot, if any refresh has installed one.
    pub async fn current(&self) -> Option<Arc<T>> {
        self.state.read().await.value.clone()
    }

    /// Ticket number of the installed snapshot. 0 before the first install.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.installed_ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_slot() {
        let slot: SnapshotSlot<u32> = SnapshotSlot::new();
        assert!(slot.current().await.is_none());
        assert_eq!(slot.generation().await, 0);
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let slot = SnapshotSlot::new();
        let first = slot.begin().await;
        let second = slot.begin().await;

        assert_eq!(slot.install(second, "fresh").await, RefreshOutcome::Installed);
        assert_eq!(slot.install(first, "stale").await, RefreshOutcome::Superseded);

        assert_eq!(*slot.current().await.unwrap(), "fresh");
        assert_eq!(slot.generation().await, 2);
    }

    #[tokio::test]
    async fn test_older_result_dropped_even_if_newer_still_pending() {
        let slot = SnapshotSlot::new();
        let first = slot.begin().await;
        assert_eq!(slot.install(first, 1).await, RefreshOutcome::Installed);

        let slow = slot.begin().await;
        let _pending = slot.begin().await;
        assert_eq!(slot.install(slow, 2).await, RefreshOutcome::Superseded);

        // previous snapshot still readable
        assert_eq!(*slot.current().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_is_latest_tracks_newest_ticket() {
        let slot: SnapshotSlot<u32> = SnapshotSlot::new();
        let first = slot.begin().await;
        assert!(slot.is_latest(first).await);

        let second = slot.begin().await;
        assert!(!slot.is_latest(first).await);
        assert!(slot.is_latest(second).await);
    }
}
