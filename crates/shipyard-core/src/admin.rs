//! Operator surface: read-only rollups plus the only deletion paths in the
//! system, all gated on the configured admin identity.

use uuid::Uuid;

use shipyard_types::models::User;

use crate::app::App;
use crate::error::AdminError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminOverview {
    pub total_users: usize,
    pub total_listings: usize,
    pub total_messages: usize,
    /// No deactivation state exists, so this equals `total_listings`.
    pub active_listings: usize,
}

impl App {
    fn require_admin(&self, user: &User) -> Result<(), AdminError> {
        if self.is_admin(user) {
            Ok(())
        } else {
            Err(AdminError::NotAdmin)
        }
    }

    pub fn admin_overview(&self, admin: &User) -> Result<AdminOverview, AdminError> {
        self.require_admin(admin)?;
        Ok(AdminOverview {
            total_users: self.users.len(),
            total_listings: self.listings.len(),
            total_messages: self.messages.len(),
            active_listings: self.listings.len(),
        })
    }

    pub fn admin_delete_user(&mut self, admin: &User, id: Uuid) -> Result<(), AdminError> {
        self.require_admin(admin)?;
        self.remove_user_record(id)?;
        Ok(())
    }

    pub fn admin_delete_listing(&mut self, admin: &User, id: Uuid) -> Result<(), AdminError> {
        self.require_admin(admin)?;
        self.remove_listing_record(id)?;
        Ok(())
    }

    pub fn admin_delete_message(&mut self, admin: &User, id: Uuid) -> Result<(), AdminError> {
        self.require_admin(admin)?;
        self.remove_message_record(id)?;
        Ok(())
    }
}
