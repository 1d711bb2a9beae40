//! Bookkeeping for every notification the engine has emitted.
//!
//! A dedupe key may have at most one live record. Live means scheduled with
//! the collaborator or handed over for presentation and not yet confirmed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Timer armed with the delivery collaborator.
    Scheduled,
    /// Handed over for presentation.
    Presented,
    /// Collaborator confirmed the user saw it.
    Delivered,
    Cancelled,
    /// Dropped at fire time by the condition re-check.
    Suppressed,
}

impl NotificationStatus {
    pub fn is_live(self) -> bool {
        matches!(self, NotificationStatus::Scheduled | NotificationStatus::Presented)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub kind: NotificationKind,
    pub dedupe_key: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: NotificationStatus,
}

impl NotificationRecord {
    pub fn delivered(&self) -> bool {
        self.status == NotificationStatus::Delivered
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLedger {
    records: Vec<NotificationRecord>,
    capacity: usize,
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl NotificationLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn get(&self, dedupe_key: &str) -> Option<&NotificationRecord> {
        self.records.iter().rev().find(|r| r.dedupe_key == dedupe_key)
    }

    fn get_mut(&mut self, dedupe_key: &str) -> Option<&mut NotificationRecord> {
        self.records.iter_mut().rev().find(|r| r.dedupe_key == dedupe_key)
    }

    /// Live records of one kind. The engine keeps this at most one per kind.
    pub fn live(&self, kind: NotificationKind) -> impl Iterator<Item = &NotificationRecord> {
        self.records
            .iter()
            .filter(move |r| r.kind == kind && r.status.is_live())
    }

    /// Record a newly armed timer. Refused if the key was already used.
    pub fn try_schedule(
        &mut self,
        kind: NotificationKind,
        dedupe_key: &str,
        at: DateTime<Utc>,
    ) -> bool {
        if self.get(dedupe_key).is_some() {
            return false;
        }
        self.push(NotificationRecord {
            kind,
            dedupe_key: dedupe_key.to_string(),
            scheduled_at: at,
            status: NotificationStatus::Scheduled,
        });
        true
    }

    /// Record a presentation. Allowed for a fresh key or one whose timer just fired.
    pub fn try_present(
        &mut self,
        kind: NotificationKind,
        dedupe_key: &str,
        at: DateTime<Utc>,
    ) -> bool {
        match self.get_mut(dedupe_key) {
            Some(record) if record.status == NotificationStatus::Scheduled => {
                record.status = NotificationStatus::Presented;
                true
            }
            Some(_) => false,
            None => {
                self.push(NotificationRecord {
                    kind,
                    dedupe_key: dedupe_key.to_string(),
                    scheduled_at: at,
                    status: NotificationStatus::Presented,
                });
                true
            }
        }
    }

    /// Mark a live record cancelled. Returns whether anything was live.
    pub fn cancel(&mut self, dedupe_key: &str) -> bool {
        self.finish(dedupe_key, NotificationStatus::Cancelled)
    }

    pub fn suppress(&mut self, dedupe_key: &str) -> bool {
        self.finish(dedupe_key, NotificationStatus::Suppressed)
    }

    pub fn mark_delivered(&mut self, dedupe_key: &str) -> bool {
        match self.get_mut(dedupe_key) {
            Some(record) if record.status == NotificationStatus::Presented => {
                record.status = NotificationStatus::Delivered;
                true
            }
            _ => false,
        }
    }

    fn finish(&mut self, dedupe_key: &str, status: NotificationStatus) -> bool {
        match self.get_mut(dedupe_key) {
            Some(record) if record.status.is_live() => {
                record.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    fn push(&mut self, record: NotificationRecord) {
        self.records.push(record);
        self.evict();
    }

    fn evict(&mut self) {
        while self.records.len() > self.capacity {
            // Evict the oldest finished record; live ones are never dropped.
            match self.records.iter().position(|r| !r.status.is_live()) {
                Some(idx) => {
                    self.records.remove(idx);
                }
                None => break,
            }
        }
    }
}
