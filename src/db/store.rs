// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity store: typed access to the four collections.
//!
//! Provides, for any [`Entity`]:
//! - `get` / `resolve` (find-or-NotFound) / `list` / `find`
//! - `insert` / `upsert` / `delete`
//! - `modify`: a read-modify-write serialized per document
//!
//! Concurrent `modify` calls on the same document inside this process run one
//! at a time, so checks made inside the closure still hold at write time.

use crate::config::{Config, StorageBackend};
use crate::db::{Entity, FirestoreBackend, MemoryBackend};
use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared per-document locks, keyed by `collection/id`.
pub type DocumentLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Held lock from [`Db::lock`]. Dropping it releases the lock and removes the
/// map entry once no other task holds or waits on it.
pub struct LockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: DocumentLocks,
    key: String,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Release first so the guard's own reference is not counted.
        drop(self.guard.take());
        self.locks.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreBackend),
    Memory(Arc<MemoryBackend>),
    Offline,
}

/// Database handle shared by all services.
#[derive(Clone)]
pub struct Db {
    backend: Backend,
    locks: DocumentLocks,
}

impl Db {
    /// Open the backend selected by configuration.
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.storage_backend {
            StorageBackend::Firestore => Self::firestore(&config.gcp_project_id).await,
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Connect to Firestore (or its emulator).
    pub async fn firestore(project_id: &str) -> Result<Self> {
        let backend = FirestoreBackend::connect(project_id).await?;
        Ok(Self::with_backend(Backend::Firestore(backend)))
    }

    /// Create an empty in-process store.
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory(Arc::new(MemoryBackend::new())))
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self::with_backend(Backend::Offline)
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Generate a fresh opaque document ID.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Get an entity by ID.
    pub async fn get<T: Entity>(&self, id: &str) -> Result<Option<T>> {
        match &self.backend {
            Backend::Firestore(fs) => fs.get(T::COLLECTION, id).await,
            Backend::Memory(mem) => mem.get(T::COLLECTION, id),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get an entity by ID, or fail with `NotFound`.
    pub async fn resolve<T: Entity>(&self, id: &str) -> Result<T> {
        self.get::<T>(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::KIND, id)))
    }

    /// All entities of a kind, in store order.
    pub async fn list<T: Entity>(&self) -> Result<Vec<T>> {
        match &self.backend {
            Backend::Firestore(fs) => fs.list(T::COLLECTION).await,
            Backend::Memory(mem) => mem.list(T::COLLECTION),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Entities matching `predicate`, in store order.
    pub async fn find<T, P>(&self, predicate: P) -> Result<Vec<T>>
    where
        T: Entity,
        P: Fn(&T) -> bool + Send,
    {
        let all = self.list::<T>().await?;
        Ok(all.into_iter().filter(|entity| predicate(entity)).collect())
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Create a new entity.
    pub async fn insert<T: Entity>(&self, entity: &T) -> Result<()> {
        match &self.backend {
            // IDs are fresh UUIDs, so Firestore's upsert cannot clobber anything.
            Backend::Firestore(fs) => fs.upsert(T::COLLECTION, entity.id(), entity).await,
            Backend::Memory(mem) => mem.insert(T::COLLECTION, entity.id(), entity),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create or replace an entity.
    pub async fn upsert<T: Entity>(&self, entity: &T) -> Result<()> {
        match &self.backend {
            Backend::Firestore(fs) => fs.upsert(T::COLLECTION, entity.id(), entity).await,
            Backend::Memory(mem) => mem.upsert(T::COLLECTION, entity.id(), entity),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Delete an entity by ID.
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<()> {
        let _guard = self.lock_document::<T>(id).await;
        match &self.backend {
            Backend::Firestore(fs) => fs.delete(T::COLLECTION, id).await,
            Backend::Memory(mem) => mem.delete(T::COLLECTION, id),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Read, mutate and write back one entity under its document lock.
    ///
    /// `NotFound` if the entity does not exist. If `mutate` fails nothing is
    /// written and its error is returned.
    pub async fn modify<T, R, F>(&self, id: &str, mutate: F) -> Result<(T, R)>
    where
        T: Entity,
        R: Send,
        F: FnOnce(&mut T) -> Result<R> + Send,
    {
        let _guard = self.lock_document::<T>(id).await;

        let mut entity = self.resolve::<T>(id).await?;
        let outcome = mutate(&mut entity)?;
        self.upsert(&entity).await?;

        Ok((entity, outcome))
    }

    /// Acquire the lock `modify` uses for one document.
    ///
    /// Lets a caller hold a document steady across several reads; it must
    /// not call `modify` or `delete` on the same document while holding it.
    pub async fn lock_document<T: Entity>(&self, id: &str) -> LockGuard {
        self.lock(document_key::<T>(id)).await
    }

    /// Acquire the in-process lock for an arbitrary key.
    ///
    /// Used for invariants that span documents, such as unique emails.
    /// Keys may come from request input; entries live only while in use.
    pub async fn lock(&self, key: String) -> LockGuard {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        LockGuard {
            guard: Some(guard),
            locks: self.locks.clone(),
            key,
        }
    }

    /// Number of lock entries currently tracked.
    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Make the next `count` writes to `collection` fail (in-memory only).
    #[cfg(test)]
    pub(crate) fn fail_next_writes(&self, collection: &'static str, count: usize) {
        if let Backend::Memory(mem) = &self.backend {
            mem.fail_next_writes(collection, count);
        }
    }
}

fn document_key<T: Entity>(id: &str) -> String {
    format!("{}/{}", T::COLLECTION, id)
}
