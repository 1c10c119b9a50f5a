//! State-change notification for the review session
//!
//! Every mutation bumps a revision and publishes it on a watch channel.
//! Observers re-read whatever they display from the session when the
//! revision changes; the session never calls into presentation code.

use tokio::sync::watch;

/// What kind of mutation produced a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Reset,
    Loaded,
    Analysis,
    Decision,
    Selection,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub revision: u64,
    pub kind: ChangeKind,
}

pub struct ChangeNotifier {
    tx: watch::Sender<StateChange>,
    revision: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StateChange {
            revision: 0,
            kind: ChangeKind::Reset,
        });
        Self { tx, revision: 0 }
    }

    pub fn notify(&mut self, kind: ChangeKind) {
        self.revision += 1;
        // send_replace succeeds with or without live receivers
        self.tx.send_replace(StateChange {
            revision: self.revision,
            kind,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<StateChange> {
        self.tx.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_see_latest_change() {
        let mut notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();
        assert!(!rx.has_changed().unwrap());

        notifier.notify(ChangeKind::Loaded);
        notifier.notify(ChangeKind::Selection);

        assert!(rx.has_changed().unwrap());
        let change = *rx.borrow_and_update();
        assert_eq!(change.revision, 2);
        assert_eq!(change.kind, ChangeKind::Selection);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_notify_without_subscribers() {
        let mut notifier = ChangeNotifier::new();
        notifier.notify(ChangeKind::Decision);
        assert_eq!(notifier.revision(), 1);
    }
}
