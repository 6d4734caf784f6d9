//! Destination (trip) model for storage and API.

use serde::{Deserialize, Serialize};

/// Kind of trip a destination offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "open trip")]
    OpenTrip,
    #[serde(rename = "private trip")]
    PrivateTrip,
    #[serde(rename = "honeymoon")]
    Honeymoon,
}

/// Physical demand of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Leisurely,
    Moderate,
    Challenging,
}

/// A bookable trip stored in the `destinations` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Document ID
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    pub activity_level: ActivityLevel,
    /// Guide (user) offering this trip
    #[serde(default)]
    pub guide: Option<String>,
    pub description: String,
    pub benefits: String,
    /// Non-negative price
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    /// Opaque photo reference from the media layer
    pub photo: String,
}
