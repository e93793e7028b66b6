//! In-memory session accounts for the citizen portal.
//!
//! Accounts carry an explicit [`Role`]; administrative access is a property of the
//! account record, never derived from the shape of an email address.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflows::residency::applications::validation::is_valid_email;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("an account already exists for this email")]
    DuplicateAccount,
    #[error("email or password is incorrect")]
    BadCredentials,
    #[error("no user is signed in")]
    NotSignedIn,
}

struct Account {
    display_name: String,
    password: String,
    role: Role,
}

/// Registration and login over an in-memory account store. One signed-in user at
/// a time, mirroring a single browser session.
pub struct SessionManager {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<User>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
        }
    }

    pub fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, SessionError> {
        let email = email.trim().to_ascii_lowercase();
        if !is_valid_email(&email) {
            return Err(SessionError::InvalidEmail);
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(SessionError::PasswordTooShort);
        }

        let mut accounts = self.accounts.lock().expect("session account store poisoned");
        if accounts.contains_key(&email) {
            return Err(SessionError::DuplicateAccount);
        }
        accounts.insert(
            email.clone(),
            Account {
                display_name: display_name.trim().to_string(),
                password: password.to_string(),
                role,
            },
        );

        let user = User {
            email,
            display_name: display_name.trim().to_string(),
            role,
        };
        *self.current.lock().expect("session state poisoned") = Some(user.clone());
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let email = email.trim().to_ascii_lowercase();
        if !is_valid_email(&email) {
            return Err(SessionError::InvalidEmail);
        }

        let accounts = self.accounts.lock().expect("session account store poisoned");
        let account = accounts.get(&email).ok_or(SessionError::BadCredentials)?;
        if account.password != password {
            return Err(SessionError::BadCredentials);
        }

        let user = User {
            email,
            display_name: account.display_name.clone(),
            role: account.role,
        };
        drop(accounts);
        *self.current.lock().expect("session state poisoned") = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        let mut current = self.current.lock().expect("session state poisoned");
        if current.is_none() {
            return Err(SessionError::NotSignedIn);
        }
        *current = None;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.lock().expect("session state poisoned").clone()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn register_signs_the_user_in() {
        let sessions = SessionManager::new();
        let user = sessions
            .register("ada@example.com", "Ada Okafor", "sekret1", Role::Citizen)
            .unwrap();
        assert_eq!(user.role, Role::Citizen);
        assert_eq!(sessions.current_user(), Some(user));
    }

    #[test]
    fn register_rejects_short_passwords_and_bad_emails() {
        let sessions = SessionManager::new();
        assert_eq!(
            sessions.register("ada@example.com", "Ada", "short", Role::Citizen),
            Err(SessionError::PasswordTooShort)
        );
        assert_eq!(
            sessions.register("not-an-email", "Ada", "sekret1", Role::Citizen),
            Err(SessionError::InvalidEmail)
        );
    }

    #[test]
    fn login_requires_matching_credentials() {
        let sessions = SessionManager::new();
        sessions
            .register("ada@example.com", "Ada", "sekret1", Role::Citizen)
            .unwrap();
        sessions.logout().unwrap();

        assert_eq!(
            sessions.login("ada@example.com", "wrong-pass"),
            Err(SessionError::BadCredentials)
        );
        let user = sessions.login("ada@example.com", "sekret1").unwrap();
        assert_eq!(user.display_name, "Ada");
    }

    #[test]
    fn admin_role_is_explicit_not_inferred_from_email() {
        let sessions = SessionManager::new();
        let user = sessions
            .register("admin@example.com", "Desk Officer", "sekret1", Role::Citizen)
            .unwrap();
        assert_eq!(user.role, Role::Citizen);

        sessions.logout().unwrap();
        let admin = sessions
            .register("citizen@example.com", "Registrar", "sekret1", Role::Admin)
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn logout_without_a_session_fails() {
        let sessions = SessionManager::new();
        assert_eq!(sessions.logout(), Err(SessionError::NotSignedIn));
    }
}
