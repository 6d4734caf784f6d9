//! Review model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A traveler review stored in the `reviews` collection.
///
/// Reviews point at their destination; destinations keep no back-reference,
/// so a destination's reviews are found by querying this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Document ID
    pub id: String,
    pub photo: String,
    pub review: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub destination: Option<String>,
    pub created_at: DateTime<Utc>,
}
