use std::sync::Arc;

use uuid::Uuid;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::store::CredentialStore;
use crate::user::User;

/// User manager.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn CredentialStore>,
    pwd: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(users: Arc<dyn CredentialStore>, pwd: Arc<PasswordManager>) -> Self {
        Self { users, pwd }
    }

    /// Register a new user.
    ///
    /// Hash password and lowercase email before storing.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: email.to_lowercase(),
            password: self.pwd.hash_password(password)?,
            created_at: chrono::Utc::now(),
        };

        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    /// Authenticate with username or email.
    ///
    /// Unknown identifier and wrong password fail the same way.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_identifier(identifier)
            .await?
            .ok_or(ServerError::InvalidCredentials)?;

        self.pwd
            .verify_password(password, &user.password)
            .map_err(|_| ServerError::InvalidCredentials)?;

        Ok(user)
    }

    /// Resolve a user id from a decoded token.
    pub async fn find(&self, user_id: Uuid) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }
}
