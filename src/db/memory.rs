// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Documents are kept as JSON values keyed by `(collection, id)`, so they go
//! through the same serde round trip as Firestore documents. Listing returns
//! documents in insertion order; an update keeps a document's position.

use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

type DocumentKey = (&'static str, String);

struct StoredDocument {
    seq: u64,
    body: serde_json::Value,
}

/// Process-local document store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryBackend {
    documents: DashMap<DocumentKey, StoredDocument>,
    next_seq: AtomicU64,
    #[cfg(test)]
    failing_writes: DashMap<&'static str, usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a document by ID.
    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<T>, AppError> {
        self.documents
            .get(&(collection, id.to_string()))
            .map(|doc| decode(&doc.body))
            .transpose()
    }

    /// All documents in a collection, in insertion order.
    pub fn list<T: DeserializeOwned>(&self, collection: &'static str) -> Result<Vec<T>, AppError> {
        let mut docs: Vec<(u64, serde_json::Value)> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| (entry.value().seq, entry.value().body.clone()))
            .collect();
        docs.sort_by_key(|(seq, _)| *seq);

        docs.iter().map(|(_, body)| decode(body)).collect()
    }

    /// Create a document; fails if the ID is taken.
    pub fn insert<T: Serialize>(
        &self,
        collection: &'static str,
        id: &str,
        entity: &T,
    ) -> Result<(), AppError> {
        self.check_injected_failure(collection)?;
        let body = encode(entity)?;

        match self.documents.entry((collection, id.to_string())) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Document {}/{} already exists",
                collection, id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    body,
                });
                Ok(())
            }
        }
    }

    /// Create or replace a document.
    pub fn upsert<T: Serialize>(
        &self,
        collection: &'static str,
        id: &str,
        entity: &T,
    ) -> Result<(), AppError> {
        self.check_injected_failure(collection)?;
        let body = encode(entity)?;

        match self.documents.entry((collection, id.to_string())) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().body = body;
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    body,
                });
            }
        }
        Ok(())
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub fn delete(&self, collection: &'static str, id: &str) -> Result<(), AppError> {
        self.check_injected_failure(collection)?;
        self.documents.remove(&(collection, id.to_string()));
        Ok(())
    }

    /// Make the next `count` writes to `collection` fail.
    #[cfg(test)]
    pub(crate) fn fail_next_writes(&self, collection: &'static str, count: usize) {
        self.failing_writes.insert(collection, count);
    }

    #[cfg(test)]
    fn check_injected_failure(&self, collection: &'static str) -> Result<(), AppError> {
        if let Some(mut remaining) = self.failing_writes.get_mut(collection) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::Database(format!(
                    "Injected write failure on {}",
                    collection
                )));
            }
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_injected_failure(&self, _collection: &'static str) -> Result<(), AppError> {
        Ok(())
    }
}

fn encode<T: Serialize>(entity: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(entity).map_err(|e| AppError::Database(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &serde_json::Value) -> Result<T, AppError> {
    T::deserialize(body).map_err(|e| AppError::Database(e.to_string()))
}
