// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory trip storage.

use crate::db::TripRecord;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-local trip records, shared across clones.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<String, TripRecord>>,
}

impl MemoryStore {
    pub fn get(&self, id: &str) -> Option<TripRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn put(&self, id: &str, record: TripRecord) {
        self.records.insert(id.to_string(), record);
    }
}
