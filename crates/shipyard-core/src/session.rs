//! Session lifecycle: Created → Active → Expired, with expiry detected
//! lazily on read. Logout clears only the current-session pointer; the row
//! itself stays until `cleanup_expired` prunes it.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shipyard_types::models::{Session, User};

use crate::app::App;

pub const SESSION_TTL_DAYS: i64 = 7;

impl App {
    pub fn create_session(&mut self, user_id: Uuid) -> Result<Session> {
        self.create_session_at(user_id, Utc::now())
    }

    /// Issue a session expiring TTL from `now` and make it current.
    pub fn create_session_at(&mut self, user_id: Uuid, now: DateTime<Utc>) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        };

        self.sessions.push(session.clone());
        self.persist_sessions()?;
        self.current_session = Some(session.clone());
        self.persist_current_session()?;

        debug!("session {} created for user {}", session.id, user_id);
        Ok(session)
    }

    pub fn resolve_current_user(&mut self) -> Result<Option<User>> {
        self.resolve_current_user_at(Utc::now())
    }

    /// Restore identity from the stored pointer. A pointer to an expired
    /// session or a deleted user is cleared on the way out, so the next
    /// read starts clean.
    pub fn resolve_current_user_at(&mut self, now: DateTime<Utc>) -> Result<Option<User>> {
        let Some(session) = self.current_session.clone() else {
            return Ok(None);
        };

        if !session.is_active_at(now) {
            debug!("current session {} expired; clearing pointer", session.id);
            self.current_session = None;
            self.persist_current_session()?;
            return Ok(None);
        }

        match self.user_by_id(session.user_id) {
            Some(user) => Ok(Some(user.clone())),
            None => {
                debug!(
                    "current session {} references missing user {}; clearing pointer",
                    session.id, session.user_id
                );
                self.current_session = None;
                self.persist_current_session()?;
                Ok(None)
            }
        }
    }

    /// Drop the pointer only. The session row remains valid until expiry.
    pub fn logout(&mut self) -> Result<()> {
        if self.current_session.take().is_some() {
            self.persist_current_session()?;
            info!("logged out");
        }
        Ok(())
    }

    pub fn cleanup_expired(&mut self) -> Result<usize> {
        self.cleanup_expired_at(Utc::now())
    }

    /// Prune expired session rows. Leaves the current-session pointer to the
    /// resolve path, which reconciles it on its own.
    pub fn cleanup_expired_at(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.is_active_at(now));
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            self.persist_sessions()?;
            info!("cleanup: pruned {} expired sessions", pruned);
        }
        Ok(pruned)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_store::Store;

    fn app_with_user() -> (App, User) {
        let mut app = App::load(Store::open_in_memory().unwrap(), None).unwrap();
        let user = app
            .register("Froggy", "Froggy#1234", "froggy@example.com", "Str0ng!pass")
            .unwrap();
        (app, user)
    }

    #[test]
    fn session_expires_after_ttl() {
        let (mut app, user) = app_with_user();
        let now = Utc::now();
        let session = app.create_session_at(user.id, now).unwrap();

        assert!(session.is_active_at(now));
        assert!(session.is_active_at(now + Duration::days(7) - Duration::seconds(1)));
        assert!(!session.is_active_at(now + Duration::days(7)));

        let resolved = app.resolve_current_user_at(now).unwrap();
        assert_eq!(resolved.unwrap().id, user.id);

        let resolved = app.resolve_current_user_at(now + Duration::days(8)).unwrap();
        assert!(resolved.is_none());
        // self-healed: the pointer is gone even when asked again at `now`
        assert!(app.resolve_current_user_at(now).unwrap().is_none());
    }

    #[test]
    fn resolve_clears_pointer_for_deleted_user() {
        let (mut app, user) = app_with_user();
        app.create_session(user.id).unwrap();
        app.remove_user_record(user.id).unwrap();

        assert!(app.resolve_current_user().unwrap().is_none());
        assert!(app.current_session.is_none());
    }

    #[test]
    fn logout_keeps_the_session_row() {
        let (mut app, user) = app_with_user();
        let session = app.create_session(user.id).unwrap();

        app.logout().unwrap();
        assert!(app.resolve_current_user().unwrap().is_none());
        assert!(app.sessions().iter().any(|s| s.id == session.id));
    }

    #[test]
    fn cleanup_prunes_only_expired_rows() {
        let (mut app, user) = app_with_user();
        let now = Utc::now();
        let stale = app.create_session_at(user.id, now - Duration::days(30)).unwrap();
        let live = app.create_session_at(user.id, now).unwrap();

        let pruned = app.cleanup_expired_at(now).unwrap();
        assert_eq!(pruned, 1);
        assert!(!app.sessions().iter().any(|s| s.id == stale.id));
        assert!(app.sessions().iter().any(|s| s.id == live.id));

        // safe to call again; nothing left to prune
        assert_eq!(app.cleanup_expired_at(now).unwrap(), 0);
    }
}
