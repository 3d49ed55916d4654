use tokio::sync::broadcast;

use crate::constants::EVENT_CHANNEL_CAPACITY;

/// Table whose contents changed as the result of a committed write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableChange {
    Platforms,
    Accounts,
}

/// Lightweight broadcast bus that fans out table-change notifications
/// to any subscriber (the coordinator re-queries on receipt).
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TableChange>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }

    pub fn publish(&self, change: TableChange) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(change);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
