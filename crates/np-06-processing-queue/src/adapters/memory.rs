//! In-memory payload and feed stores.
//!
//! Used by the dev runtime and tests. Selection order matches the SQL the
//! relational adapter runs:
//!
//! ```sql
//! SELECT * FROM payloads WHERE processed = 0 AND attempts < ?
//! ORDER BY attempts ASC, timestamp DESC LIMIT ?
//! ```

use crate::domain::entities::{FeedRecord, NewPayload, PayloadItem};
use crate::ports::outbound::{FeedStore, PayloadStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use shared_types::PayloadId;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryPayloadStore {
    rows: RwLock<BTreeMap<PayloadId, PayloadItem>>,
    next_id: AtomicU64,
}

impl InMemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Overwrite the attempt counter of a row.
    pub fn set_attempts(&self, id: PayloadId, attempts: u32) {
        if let Some(row) = self.rows.write().get_mut(&id) {
            row.attempts = attempts;
        }
    }

    fn filtered(&self, predicate: impl Fn(&PayloadItem) -> bool) -> Vec<PayloadItem> {
        self.rows
            .read()
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PayloadStore for InMemoryPayloadStore {
    async fn insert(&self, row: NewPayload) -> Result<PayloadId, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.write().insert(id, PayloadItem::from_new(id, row));
        Ok(id)
    }

    async fn get(&self, id: PayloadId) -> Result<Option<PayloadItem>, StoreError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn select_pending(
        &self,
        max_attempts: u32,
        limit: usize,
    ) -> Result<Vec<PayloadItem>, StoreError> {
        let mut rows = self.filtered(|row| !row.processed && row.attempts < max_attempts);
        rows.sort_by_key(|row| (row.attempts, Reverse(row.timestamp), Reverse(row.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn mark_processed(&self, id: PayloadId, payload: &Value) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        row.og_payload = Some(payload.clone());
        row.processed = true;
        Ok(())
    }

    async fn bump_attempts(&self, id: PayloadId) -> Result<u32, StoreError> {
        let mut rows = self.rows.write();
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        row.attempts += 1;
        Ok(row.attempts)
    }

    async fn count_pending(&self, max_attempts: u32) -> Result<usize, StoreError> {
        Ok(self
            .filtered(|row| !row.processed && row.attempts < max_attempts)
            .len())
    }

    async fn select_abandoned(&self, max_attempts: u32) -> Result<Vec<PayloadItem>, StoreError> {
        Ok(self.filtered(|row| row.is_abandoned(max_attempts)))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    records: RwLock<Vec<FeedRecord>>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FeedRecord> {
        self.records.read().clone()
    }

    pub fn for_payload(&self, payload_id: PayloadId) -> Vec<FeedRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| record.payload_id == payload_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn insert(&self, record: FeedRecord) -> Result<(), StoreError> {
        self.records.write().push(record);
        Ok(())
    }
}
