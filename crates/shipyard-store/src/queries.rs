use std::collections::BTreeSet;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use shipyard_types::models::{Listing, Message, Purchase, Session, User};

use crate::migrations::SCHEMA_VERSION;
use crate::{keys, Store};

impl Store {
    fn get_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.with_conn(|conn| {
            let raw: Option<String> = match conn.query_row(
                "SELECT value FROM documents WHERE key = ?1",
                [key],
                |row| row.get(0),
            ) {
                Ok(v) => Some(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            match raw {
                Some(raw) => {
                    let value = serde_json::from_str(&raw).map_err(|e| {
                        anyhow::anyhow!("corrupt document '{}': {}", key, e)
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        })
    }

    fn put_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (key, version, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET version = ?2, value = ?3,
                     updated_at = datetime('now')",
                rusqlite::params![key, SCHEMA_VERSION, raw],
            )?;
            Ok(())
        })
    }

    fn delete_doc(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM documents WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    // -- Users --

    pub fn load_users(&self) -> Result<Vec<User>> {
        Ok(self.get_doc(keys::USERS)?.unwrap_or_default())
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.put_doc(keys::USERS, &users)
    }

    // -- Sessions --

    pub fn load_sessions(&self) -> Result<Vec<Session>> {
        Ok(self.get_doc(keys::SESSIONS)?.unwrap_or_default())
    }

    pub fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        self.put_doc(keys::SESSIONS, &sessions)
    }

    pub fn load_current_session(&self) -> Result<Option<Session>> {
        self.get_doc(keys::CURRENT_SESSION)
    }

    pub fn save_current_session(&self, session: &Session) -> Result<()> {
        self.put_doc(keys::CURRENT_SESSION, session)
    }

    pub fn clear_current_session(&self) -> Result<()> {
        self.delete_doc(keys::CURRENT_SESSION)
    }

    // -- Listings --

    pub fn load_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.get_doc(keys::LISTINGS)?.unwrap_or_default())
    }

    pub fn save_listings(&self, listings: &[Listing]) -> Result<()> {
        self.put_doc(keys::LISTINGS, &listings)
    }

    // -- Messages --

    pub fn load_messages(&self) -> Result<Vec<Message>> {
        Ok(self.get_doc(keys::MESSAGES)?.unwrap_or_default())
    }

    pub fn save_messages(&self, messages: &[Message]) -> Result<()> {
        self.put_doc(keys::MESSAGES, &messages)
    }

    // -- Preferences --

    pub fn load_purchases(&self) -> Result<Vec<Purchase>> {
        Ok(self.get_doc(keys::PURCHASES)?.unwrap_or_default())
    }

    pub fn save_purchases(&self, purchases: &[Purchase]) -> Result<()> {
        self.put_doc(keys::PURCHASES, &purchases)
    }

    /// Favorites, wishlist and the own-listings index all persist as plain
    /// id sequences.
    pub fn load_id_list(&self, key: &str) -> Result<Vec<Uuid>> {
        Ok(self.get_doc(key)?.unwrap_or_default())
    }

    pub fn save_id_list(&self, key: &str, ids: &[Uuid]) -> Result<()> {
        self.put_doc(key, &ids)
    }

    pub fn load_custom_tags(&self) -> Result<BTreeSet<String>> {
        Ok(self.get_doc(keys::CUSTOM_TAGS)?.unwrap_or_default())
    }

    pub fn save_custom_tags(&self, tags: &BTreeSet<String>) -> Result<()> {
        self.put_doc(keys::CUSTOM_TAGS, tags)
    }
}
