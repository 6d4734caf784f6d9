// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role → capability table.
//!
//! The table is configuration data: a JSON object mapping each role name to
//! the capability names it holds. It is loaded once at startup (from
//! `ROLES_FILE`, or the built-in `data/roles.json`) and never mutated; a new
//! table means a new deployment.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Built-in table, used when no `ROLES_FILE` is configured.
const BUILTIN_ROLES: &str = include_str!("../data/roles.json");

/// Capability names as constants.
pub mod capabilities {
    pub const GET_USERS: &str = "getUsers";
    pub const MANAGE_USERS: &str = "manageUsers";
    pub const MANAGE_DESTINATIONS: &str = "manageDestinations";
    pub const MANAGE_ORDERS: &str = "manageOrders";
    pub const GET_REVIEW: &str = "getReview";
    pub const MANAGE_REVIEW: &str = "manageReview";
}

/// Immutable mapping from role name to the capabilities it grants.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    roles: HashMap<String, HashSet<String>>,
}

impl PermissionTable {
    /// Parse the built-in table.
    pub fn builtin() -> Result<Self, PermissionTableError> {
        Self::from_json(BUILTIN_ROLES)
    }

    /// Load a table from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PermissionTableError> {
        let json = fs::read_to_string(path.as_ref())
            .map_err(|e| PermissionTableError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Parse a table from its JSON form: `{"role": ["capability", ...]}`.
    pub fn from_json(json: &str) -> Result<Self, PermissionTableError> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| PermissionTableError::Parse(e.to_string()))?;

        let mut roles = HashMap::with_capacity(raw.len());
        for (role, capabilities) in raw {
            if role.trim().is_empty() {
                return Err(PermissionTableError::EmptyName);
            }
            if capabilities.iter().any(|c| c.trim().is_empty()) {
                return Err(PermissionTableError::EmptyCapability(role));
            }
            roles.insert(role, capabilities.into_iter().collect());
        }

        tracing::info!(roles = roles.len(), "Permission table loaded");
        Ok(Self { roles })
    }

    /// Whether `role` appears in the table at all.
    pub fn is_known_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Whether `role` holds `capability`. Unknown roles hold nothing.
    pub fn grants(&self, role: &str, capability: &str) -> bool {
        self.roles
            .get(role)
            .is_some_and(|caps| caps.contains(capability))
    }

    /// Role names, in no particular order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}

/// Errors from loading a permission table.
#[derive(Debug, thiserror::Error)]
pub enum PermissionTableError {
    #[error("Failed to read permission table: {0}")]
    Io(String),

    #[error("Failed to parse permission table: {0}")]
    Parse(String),

    #[error("Role names must not be empty")]
    EmptyName,

    #[error("Role {0} lists an empty capability name")]
    EmptyCapability(String),
}
