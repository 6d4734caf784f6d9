// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts: signup, profile reads and edits, deletion.

use crate::context::OperationContext;
use crate::db::{collections, Db};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::time_utils::now_utc;
use serde::Deserialize;
use validator::Validate;

/// Payload for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Editable profile fields; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub header_picture: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_lock_key(email: &str) -> String {
    format!("{}/email/{}", collections::USERS, email)
}

#[derive(Clone)]
pub struct AccountsService {
    db: Db,
}

impl AccountsService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a user with default profile fields and the `user` role.
    ///
    /// Emails are stored lower-cased; a taken email is a `Conflict`.
    pub async fn signup(&self, ctx: &OperationContext, new_user: NewUser) -> Result<User> {
        new_user.validate()?;
        let email = normalize_email(&new_user.email);

        let _guard = self.db.lock(email_lock_key(&email)).await;
        ctx.checkpoint("check email")?;
        self.ensure_email_free(&email, None).await?;

        ctx.checkpoint("create user")?;
        let user = User::new(Db::new_id(), new_user.name.trim().to_string(), email, now_utc());
        self.db.insert(&user).await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn list_users(&self, ctx: &OperationContext) -> Result<Vec<User>> {
        ctx.checkpoint("list users")?;
        self.db.list::<User>().await
    }

    pub async fn get_user(&self, ctx: &OperationContext, user_id: &str) -> Result<User> {
        ctx.checkpoint("get user")?;
        self.db.resolve::<User>(user_id).await
    }

    /// Apply a profile update. Changing the email re-checks uniqueness.
    pub async fn update_user(
        &self,
        ctx: &OperationContext,
        user_id: &str,
        update: UserUpdate,
    ) -> Result<User> {
        update.validate()?;
        let email = update.email.as_deref().map(normalize_email);

        // Held across the write so two users cannot claim one email at once.
        let _email_guard = match &email {
            Some(email) => Some(self.db.lock(email_lock_key(email)).await),
            None => None,
        };
        if let Some(email) = &email {
            ctx.checkpoint("check email")?;
            self.ensure_email_free(email, Some(user_id)).await?;
        }

        ctx.checkpoint("update user")?;
        let (user, ()) = self
            .db
            .modify::<User, _, _>(user_id, |user| {
                if let Some(name) = update.name {
                    user.name = name.trim().to_string();
                }
                if let Some(email) = email {
                    user.email = email;
                }
                if let Some(description) = update.description {
                    user.description = description;
                }
                if let Some(address) = update.address {
                    user.address = address;
                }
                if let Some(phone) = update.phone {
                    user.phone = phone;
                }
                if let Some(picture) = update.profile_picture {
                    user.profile_picture = picture;
                }
                if let Some(picture) = update.header_picture {
                    user.header_picture = picture;
                }
                user.updated_at = now_utc();
                Ok(())
            })
            .await?;

        tracing::info!(user_id, "User updated");
        Ok(user)
    }

    /// Delete a user. References to it elsewhere are left dangling.
    pub async fn delete_user(&self, ctx: &OperationContext, user_id: &str) -> Result<()> {
        ctx.checkpoint("resolve user")?;
        self.db.resolve::<User>(user_id).await?;

        ctx.checkpoint("delete user")?;
        self.db.delete::<User>(user_id).await?;

        tracing::info!(user_id, "User deleted");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<&str>) -> Result<()> {
        let taken = self
            .db
            .find::<User, _>(|u| u.email == email && Some(u.id.as_str()) != owner)
            .await?;
        if !taken.is_empty() {
            return Err(AppError::Conflict(format!("email {} is already registered", email)));
        }
        Ok(())
    }
}
