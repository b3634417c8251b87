//! Account export: a self-contained JSON document with the profile (minus
//! the password hash), the preference sets, and the messages the account
//! is involved in.

use anyhow::Result;
use chrono::Utc;

use shipyard_types::export::{AccountExport, ExportedProfile, EXPORT_FORMAT_VERSION};
use shipyard_types::models::User;

use crate::app::App;

impl App {
    pub fn export_account(&self, user: &User) -> AccountExport {
        AccountExport {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            profile: ExportedProfile {
                id: user.id,
                name: user.name.clone(),
                handle: user.handle.clone(),
                email: user.email.clone(),
                joined_at: user.joined_at,
                last_login: user.last_login,
                login_count: user.login_count,
            },
            favorites: self.favorites.clone(),
            wishlist: self.wishlist.clone(),
            purchases: self.purchases.clone(),
            custom_tags: self.custom_tags.iter().cloned().collect(),
            messages: self
                .messages
                .iter()
                .filter(|m| m.buyer_id == user.id || m.seller_id == user.id)
                .cloned()
                .collect(),
        }
    }

    pub fn export_account_json(&self, user: &User) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_account(user))?)
    }
}
