use chrono::Utc;
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::User;
use crate::store::Store;

use super::AuthError;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Demo account guaranteed present in every registry.
const DEMO_EMAIL: &str = "admin@test.com";
const DEMO_PASSWORD: &str = "password123";
const DEMO_NAME: &str = "Demo User";
const DEMO_ID: &str = "demo-user";

/// User registry CRUD and session tracking over the local store.
pub struct AuthManager {
    store: Store,
    current: Option<User>,
}

impl AuthManager {
    /// Create a manager, seed the demo account if missing, and restore any
    /// persisted session.
    pub fn new(store: Store) -> Result<Self, AuthError> {
        let mut manager = Self {
            store,
            current: None,
        };
        manager.seed_demo_user()?;
        manager.current = manager.store.load_session()?;
        if let Some(ref user) = manager.current {
            debug!(email = %user.email, "restored session");
        }
        Ok(manager)
    }

    /// The currently authenticated user, if any.
    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Register a new account. Does not log the new user in.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() || password.is_empty() || confirm_password.is_empty()
        {
            return Err(ValidationError::MissingField.into());
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            }
            .into());
        }
        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let mut users = self.store.load_users()?;
        if users.contains_key(email) {
            return Err(ValidationError::EmailTaken.into());
        }

        let user = User {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        users.insert(email.to_string(), user.clone());
        self.store.save_users(&users)?;
        info!(email = %user.email, "registered new user");
        Ok(user)
    }

    /// Authenticate and establish the persisted session.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingField.into());
        }

        let users = self.store.load_users()?;
        let user = match users.get(email) {
            Some(user) if user.password == password => user.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };

        self.store.save_session(&user)?;
        info!(email = %user.email, "login");
        self.current = Some(user.clone());
        Ok(user)
    }

    /// Clear the session unconditionally.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(ref user) = self.current {
            info!(email = %user.email, "logout");
        }
        self.current = None;
        self.store.clear_session()?;
        Ok(())
    }

    /// Guarantee the demo account exists without disturbing other entries.
    fn seed_demo_user(&mut self) -> Result<(), AuthError> {
        let mut users = self.store.load_users()?;
        if !users.contains_key(DEMO_EMAIL) {
            users.insert(
                DEMO_EMAIL.to_string(),
                User {
                    id: DEMO_ID.to_string(),
                    name: DEMO_NAME.to_string(),
                    email: DEMO_EMAIL.to_string(),
                    password: DEMO_PASSWORD.to_string(),
                },
            );
            self.store.save_users(&users)?;
            debug!("seeded demo user");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
