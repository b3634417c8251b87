//! Credential store: registration and authentication over the user
//! registry. Deletion is admin-gated and lives with the other admin
//! operations.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shipyard_types::models::User;

use crate::app::App;
use crate::error::{AuthError, RegisterError};
use crate::password;
use crate::validation;

impl App {
    /// Validate, hash, and append a new account. The plaintext password
    /// never leaves this function.
    pub fn register(
        &mut self,
        name: &str,
        handle: &str,
        email: &str,
        password: &str,
    ) -> Result<User, RegisterError> {
        if name.chars().count() < 3 {
            return Err(RegisterError::NameTooShort);
        }
        if !validation::is_valid_handle(handle) {
            return Err(RegisterError::InvalidHandle);
        }
        if !validation::is_valid_email(email) {
            return Err(RegisterError::InvalidEmail);
        }
        let issues = validation::password_issues(password);
        if !issues.is_empty() {
            return Err(RegisterError::WeakPassword(issues));
        }
        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(RegisterError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            handle: handle.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(password)?,
            joined_at: Utc::now(),
            last_login: None,
            login_count: 0,
            active: true,
        };

        self.users.push(user.clone());
        self.persist_users()?;
        info!("registered account {} ({})", user.name, user.id);
        Ok(user)
    }

    /// Case-insensitive email lookup, hash verification, then a last-login
    /// touch on the matched record.
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or(AuthError::NotFound)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(AuthError::BadPassword);
        }

        user.last_login = Some(Utc::now());
        user.login_count += 1;
        let user = user.clone();
        self.persist_users()?;
        info!("login #{} for {} ({})", user.login_count, user.name, user.id);
        Ok(user)
    }

    /// Idempotent removal of a user record. Gated behind the admin surface.
    pub(crate) fn remove_user_record(&mut self, id: Uuid) -> anyhow::Result<()> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() != before {
            self.persist_users()?;
            info!("deleted user {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_store::Store;

    fn app() -> App {
        App::load(Store::open_in_memory().unwrap(), None).unwrap()
    }

    #[test]
    fn register_then_authenticate() {
        let mut app = app();
        let user = app
            .register("Froggy", "Froggy#1234", "froggy@example.com", "Str0ng!pass")
            .unwrap();
        assert_eq!(user.login_count, 0);
        assert_ne!(user.password_hash, "Str0ng!pass");

        let user = app.authenticate("froggy@example.com", "Str0ng!pass").unwrap();
        assert_eq!(user.login_count, 1);
        assert!(user.last_login.is_some());
    }

    #[test]
    fn duplicate_email_is_case_insensitive() {
        let mut app = app();
        app.register("Ada", "Ada#0001", "A@x.com", "Str0ng!pass").unwrap();
        let err = app
            .register("Eve", "Eve#0002", "a@x.com", "Str0ng!pass")
            .unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateEmail));
    }

    #[test]
    fn register_rejects_bad_fields() {
        let mut app = app();
        assert!(matches!(
            app.register("Al", "Ada#0001", "a@x.com", "Str0ng!pass"),
            Err(RegisterError::NameTooShort)
        ));
        assert!(matches!(
            app.register("Ada", "Ada0001", "a@x.com", "Str0ng!pass"),
            Err(RegisterError::InvalidHandle)
        ));
        assert!(matches!(
            app.register("Ada", "Ada#0001", "not-an-email", "Str0ng!pass"),
            Err(RegisterError::InvalidEmail)
        ));
        match app.register("Ada", "Ada#0001", "a@x.com", "weak") {
            Err(RegisterError::WeakPassword(issues)) => assert!(!issues.is_empty()),
            other => panic!("expected WeakPassword, got {:?}", other.map(|u| u.id)),
        }
    }

    #[test]
    fn authenticate_distinguishes_failures() {
        let mut app = app();
        app.register("Ada", "Ada#0001", "ada@x.com", "Str0ng!pass").unwrap();

        assert!(matches!(
            app.authenticate("ghost@x.com", "Str0ng!pass"),
            Err(AuthError::NotFound)
        ));
        assert!(matches!(
            app.authenticate("ADA@X.COM", "nope"),
            Err(AuthError::BadPassword)
        ));
    }

    #[test]
    fn login_count_is_monotonic() {
        let mut app = app();
        app.register("Ada", "Ada#0001", "ada@x.com", "Str0ng!pass").unwrap();
        for expected in 1..=3 {
            let user = app.authenticate("ada@x.com", "Str0ng!pass").unwrap();
            assert_eq!(user.login_count, expected);
        }
    }
}
