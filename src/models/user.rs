//! User model for storage and API.
//!
//! A user embeds denormalized reference lists (favorites, orders and, for
//! guides, offered products and incoming orders). The helpers below are the
//! only code that mutates those lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used by the upstream data set for empty text fields.
pub const EMPTY_TEXT: &str = "-";

/// Picture assigned to new profiles until the user uploads one.
pub const DEFAULT_PICTURE: &str =
    "https://odyssey-bucket-rpl.s3.ap-southeast-1.amazonaws.com/User/User-518bc4dd-b6ce-4484-9ffd-1459328685c2.jpg";

/// Phone number assigned to new profiles.
pub const DEFAULT_PHONE: &str = "082100000";

/// Role given to self-registered users.
pub const DEFAULT_ROLE: &str = "user";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn empty_text() -> String {
    EMPTY_TEXT.to_string()
}

/// Reference to a favorited destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRef {
    pub destination: String,
}

/// Reference to a destination a guide offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub destination: String,
}

/// Reference to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub order: String,
}

/// Guide profile attached to users who offer trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideDetails {
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_guide_name")]
    pub guide_name: String,
    #[serde(default = "empty_text")]
    pub description: String,
    #[serde(default = "empty_text")]
    pub contact: String,
    #[serde(default)]
    pub products: Vec<ProductRef>,
    #[serde(default = "empty_text")]
    pub bank_type: String,
    #[serde(default)]
    pub bank_number: u64,
    #[serde(default)]
    pub orders: Vec<OrderRef>,
}

fn default_guide_name() -> String {
    "guide".to_string()
}

impl Default for GuideDetails {
    fn default() -> Self {
        Self {
            is_verified: false,
            guide_name: default_guide_name(),
            description: empty_text(),
            contact: empty_text(),
            products: Vec::new(),
            bank_type: empty_text(),
            bank_number: 0,
            orders: Vec::new(),
        }
    }
}

/// User profile stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document ID
    pub id: String,
    pub name: String,
    /// Lower-cased, unique across users
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_guide: bool,
    #[serde(default)]
    pub guide_details: Option<GuideDetails>,
    #[serde(default = "empty_text")]
    pub description: String,
    /// Favorited destinations; never holds two refs to one destination
    #[serde(default)]
    pub favorites: Vec<FavoriteRef>,
    pub profile_picture: String,
    pub header_picture: String,
    #[serde(default = "empty_text")]
    pub address: String,
    pub phone: String,
    /// Orders placed by this user, in creation order
    #[serde(default)]
    pub orders: Vec<OrderRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh profile with upstream defaults.
    pub fn new(id: String, name: String, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            email,
            role: default_role(),
            is_email_verified: false,
            is_guide: false,
            guide_details: None,
            description: empty_text(),
            favorites: Vec::new(),
            profile_picture: DEFAULT_PICTURE.to_string(),
            header_picture: DEFAULT_PICTURE.to_string(),
            address: empty_text(),
            phone: DEFAULT_PHONE.to_string(),
            orders: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_favorite(&self, destination_id: &str) -> bool {
        self.favorites
            .iter()
            .any(|f| f.destination == destination_id)
    }

    /// Add a favorite unless one already references the destination.
    ///
    /// Returns `true` if the list changed.
    pub fn add_favorite(&mut self, destination_id: &str) -> bool {
        if self.has_favorite(destination_id) {
            return false;
        }
        self.favorites.push(FavoriteRef {
            destination: destination_id.to_string(),
        });
        true
    }

    /// Drop every favorite referencing the destination.
    ///
    /// Returns the number of references removed.
    pub fn remove_favorite(&mut self, destination_id: &str) -> usize {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.destination != destination_id);
        before - self.favorites.len()
    }

    /// Append an order reference if it is not already present.
    ///
    /// Returns `true` if the list changed. Safe to repeat.
    pub fn link_order(&mut self, order_id: &str) -> bool {
        if self.orders.iter().any(|o| o.order == order_id) {
            return false;
        }
        self.orders.push(OrderRef {
            order: order_id.to_string(),
        });
        true
    }

    /// Guide details, created with defaults when absent.
    pub fn guide_details_mut(&mut self) -> &mut GuideDetails {
        self.guide_details.get_or_insert_with(GuideDetails::default)
    }

    /// Verification flag of the guide profile; users without one are unverified.
    pub fn is_verified_guide(&self) -> bool {
        self.guide_details
            .as_ref()
            .is_some_and(|details| details.is_verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "u1".to_string(),
            "Test".to_string(),
            "test@example.com".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        let mut user = test_user();
        assert!(user.add_favorite("d1"));
        assert!(!user.add_favorite("d1"));
        assert_eq!(user.favorites.len(), 1);
    }

    #[test]
    fn test_add_favorite_checks_every_entry() {
        let mut user = test_user();
        user.add_favorite("d1");
        user.add_favorite("d2");
        user.add_favorite("d3");

        assert!(!user.add_favorite("d2"));
        assert_eq!(user.favorites.len(), 3);
    }

    #[test]
    fn test_remove_favorite_drops_all_matches() {
        let mut user = test_user();
        user.favorites = vec![
            FavoriteRef {
                destination: "d1".to_string(),
            },
            FavoriteRef {
                destination: "d2".to_string(),
            },
            FavoriteRef {
                destination: "d1".to_string(),
            },
        ];

        assert_eq!(user.remove_favorite("d1"), 2);
        assert_eq!(user.favorites.len(), 1);
        assert_eq!(user.remove_favorite("missing"), 0);
    }

    #[test]
    fn test_link_order_is_idempotent() {
        let mut user = test_user();
        assert!(user.link_order("o1"));
        assert!(!user.link_order("o1"));
        assert!(user.link_order("o2"));
        assert_eq!(user.orders.len(), 2);
    }

    #[test]
    fn test_guide_details_default_unverified() {
        let mut user = test_user();
        assert!(!user.is_verified_guide());
        user.guide_details_mut().is_verified = true;
        assert!(user.is_verified_guide());
        assert_eq!(user.guide_details.as_ref().unwrap().guide_name, "guide");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut user = test_user();
        user.guide_details_mut();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("isGuide").is_some());
        assert!(json["guideDetails"].get("isVerified").is_some());
        assert!(json.get("profilePicture").is_some());
    }
}
