//! User registration and password authentication.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{VocabError, VocabResult};
use crate::model::{new_id, User, UserStats};
use crate::store::{Store, StoreExt};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Account operations over a [`Store`].
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn Store>,
    cost: u32,
}

impl Accounts {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// bcrypt work factor for new password hashes, clamped to 4..=31.
    pub fn with_cost(mut self, cost: u32) -> Self {
        let clamped = cost.clamp(MIN_COST, MAX_COST);
        if clamped != cost {
            tracing::warn!(cost, clamped, "bcrypt cost out of range");
        }
        self.cost = clamped;
        self
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> VocabResult<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(VocabError::InvalidInput(
                "username, email and password are required".into(),
            ));
        }
        if !email.contains('@') {
            return Err(VocabError::InvalidInput(format!("not an email address: {email}")));
        }

        let users = self.store.fetch_all::<User>().await?;
        if users.iter().any(|u| u.username.eq_ignore_ascii_case(username)) {
            return Err(VocabError::AlreadyExists(format!("username {username}")));
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(VocabError::AlreadyExists(format!("email {email}")));
        }

        let password_hash = bcrypt::hash(password, self.cost)?;
        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            lists: Vec::new(),
            stats: UserStats {
                last_activity: Some(now),
                ..Default::default()
            },
        };
        self.store.save(&user).await?;

        tracing::info!(user_id = %user.id, "registered {}", user.username);
        Ok(user)
    }

    /// Check credentials. `login` matches a username or an email,
    /// case-insensitively. Returns `None` on any mismatch.
    pub async fn authenticate(&self, login: &str, password: &str) -> VocabResult<Option<User>> {
        let login = login.trim();
        let users = self.store.fetch_all::<User>().await?;
        let Some(user) = users.into_iter().find(|u| {
            u.username.eq_ignore_ascii_case(login) || u.email.eq_ignore_ascii_case(login)
        }) else {
            return Ok(None);
        };

        if bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = %user.id, "password mismatch");
            Ok(None)
        }
    }

    pub async fn get_user(&self, user_id: &str) -> VocabResult<User> {
        self.store
            .fetch::<User>(user_id)
            .await?
            .ok_or_else(|| VocabError::not_found("user", user_id))
    }
}
