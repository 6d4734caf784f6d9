//! Database layer (Firestore, with an in-process store for development).

pub mod firestore;
pub mod memory;
pub mod store;

pub use firestore::FirestoreBackend;
pub use memory::MemoryBackend;
pub use store::{Db, LockGuard};

use crate::models::{Destination, Order, Review, User};
use serde::{de::DeserializeOwned, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const DESTINATIONS: &str = "destinations";
    pub const ORDERS: &str = "orders";
    pub const REVIEWS: &str = "reviews";
}

/// A document type stored in one collection, keyed by its `id`.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding documents of this kind.
    const COLLECTION: &'static str;
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Entity for User {
    const COLLECTION: &'static str = collections::USERS;
    const KIND: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Destination {
    const COLLECTION: &'static str = collections::DESTINATIONS;
    const KIND: &'static str = "Destination";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Order {
    const COLLECTION: &'static str = collections::ORDERS;
    const KIND: &'static str = "Order";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Review {
    const COLLECTION: &'static str = collections::REVIEWS;
    const KIND: &'static str = "Review";

    fn id(&self) -> &str {
        &self.id
    }
}
