use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shipyard_store::{keys, Store};
use shipyard_types::models::{Listing, Message, Purchase, Session, User};

/// All marketplace state, owned by the composition root. Collections are
/// loaded from the store once at startup; every mutating operation writes
/// the affected document(s) back before returning.
pub struct App {
    pub(crate) store: Store,
    admin_email: Option<String>,
    pub(crate) users: Vec<User>,
    pub(crate) sessions: Vec<Session>,
    pub(crate) current_session: Option<Session>,
    pub(crate) listings: Vec<Listing>,
    pub(crate) favorites: Vec<Uuid>,
    pub(crate) wishlist: Vec<Uuid>,
    pub(crate) purchases: Vec<Purchase>,
    pub(crate) own_listings: Vec<Uuid>,
    pub(crate) custom_tags: BTreeSet<String>,
    pub(crate) messages: Vec<Message>,
}

impl App {
    pub fn load(store: Store, admin_email: Option<String>) -> Result<Self> {
        let users = store.load_users()?;
        let sessions = store.load_sessions()?;
        let current_session = store.load_current_session()?;
        let listings = store.load_listings()?;
        let favorites = store.load_id_list(keys::FAVORITES)?;
        let wishlist = store.load_id_list(keys::WISHLIST)?;
        let purchases = store.load_purchases()?;
        let own_listings = store.load_id_list(keys::OWN_LISTINGS)?;
        let custom_tags = store.load_custom_tags()?;
        let messages = store.load_messages()?;

        Ok(Self {
            store,
            admin_email,
            users,
            sessions,
            current_session,
            listings,
            favorites,
            wishlist,
            purchases,
            own_listings,
            custom_tags,
            messages,
        })
    }

    // -- Read access --

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn favorites(&self) -> &[Uuid] {
        &self.favorites
    }

    pub fn wishlist(&self) -> &[Uuid] {
        &self.wishlist
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn custom_tags(&self) -> &BTreeSet<String> {
        &self.custom_tags
    }

    pub fn user_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn listing_by_id(&self, id: Uuid) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Admin status is a property of the configured operator email, matched
    /// case-insensitively like every other email comparison.
    pub fn is_admin(&self, user: &User) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(&user.email))
    }

    /// The logged-in user, if the current session is live at `now`. Read
    /// only — does not heal a stale pointer (see `resolve_current_user`).
    pub(crate) fn active_user_at(&self, now: DateTime<Utc>) -> Option<&User> {
        let session = self.current_session.as_ref()?;
        if !session.is_active_at(now) {
            return None;
        }
        self.user_by_id(session.user_id)
    }

    pub fn active_user(&self) -> Option<&User> {
        self.active_user_at(Utc::now())
    }

    // -- Write-through persistence --

    pub(crate) fn persist_users(&self) -> Result<()> {
        self.store.save_users(&self.users)
    }

    pub(crate) fn persist_sessions(&self) -> Result<()> {
        self.store.save_sessions(&self.sessions)
    }

    pub(crate) fn persist_current_session(&self) -> Result<()> {
        match &self.current_session {
            Some(session) => self.store.save_current_session(session),
            None => self.store.clear_current_session(),
        }
    }

    pub(crate) fn persist_listings(&self) -> Result<()> {
        self.store.save_listings(&self.listings)
    }

    pub(crate) fn persist_favorites(&self) -> Result<()> {
        self.store.save_id_list(keys::FAVORITES, &self.favorites)
    }

    pub(crate) fn persist_wishlist(&self) -> Result<()> {
        self.store.save_id_list(keys::WISHLIST, &self.wishlist)
    }

    pub(crate) fn persist_purchases(&self) -> Result<()> {
        self.store.save_purchases(&self.purchases)
    }

    pub(crate) fn persist_own_listings(&self) -> Result<()> {
        self.store.save_id_list(keys::OWN_LISTINGS, &self.own_listings)
    }

    pub(crate) fn persist_custom_tags(&self) -> Result<()> {
        self.store.save_custom_tags(&self.custom_tags)
    }

    pub(crate) fn persist_messages(&self) -> Result<()> {
        self.store.save_messages(&self.messages)
    }
}
