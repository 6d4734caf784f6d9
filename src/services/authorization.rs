// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization gate over the permission table.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::permissions::PermissionTable;
use std::sync::Arc;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decides whether a caller may perform an operation.
///
/// Rules, in order:
/// 1. An unknown, empty or malformed role is denied.
/// 2. With no required capability, any known role is allowed.
/// 3. Allowed if the role holds the capability.
/// 4. Allowed if the caller is acting on their own ID (self-access).
/// 5. Denied otherwise.
#[derive(Clone)]
pub struct AuthorizationGate {
    table: Arc<PermissionTable>,
}

impl AuthorizationGate {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Pure allow/deny decision.
    pub fn check(
        &self,
        caller_role: &str,
        required_capability: Option<&str>,
        caller_id: &str,
        target_id: Option<&str>,
    ) -> Decision {
        if !self.table.is_known_role(caller_role) {
            return Decision::Deny;
        }

        let Some(capability) = required_capability else {
            return Decision::Allow;
        };

        if self.table.grants(caller_role, capability) {
            return Decision::Allow;
        }

        if !caller_id.is_empty() && target_id == Some(caller_id) {
            return Decision::Allow;
        }

        Decision::Deny
    }

    /// Check an authenticated caller, mapping a denial to `Forbidden`.
    pub fn require(
        &self,
        caller: &AuthUser,
        required_capability: Option<&str>,
        target_id: Option<&str>,
    ) -> Result<()> {
        match self.check(
            &caller.role,
            required_capability,
            &caller.user_id,
            target_id,
        ) {
            Decision::Allow => Ok(()),
            Decision::Deny => {
                tracing::warn!(
                    user_id = %caller.user_id,
                    role = %caller.role,
                    capability = ?required_capability,
                    target = ?target_id,
                    "Authorization denied"
                );
                Err(AppError::Forbidden(match required_capability {
                    Some(capability) => format!("missing capability {}", capability),
                    None => "unknown role".to_string(),
                }))
            }
        }
    }
}
