//! Messaging ledger: append-only buyer→seller messages keyed by listing.
//! The read flag is the only thing that ever changes after creation.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shipyard_types::models::{Message, User};

use crate::app::App;
use crate::error::MessageError;

impl App {
    /// Prepend a message from the logged-in user to the listing's seller.
    /// Seller identity is bound by value from the listing, with the stable
    /// id carried alongside.
    pub fn send_message(&mut self, listing_id: Uuid, body: &str) -> Result<Message, MessageError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(MessageError::EmptyBody);
        }

        let buyer = self
            .active_user()
            .cloned()
            .ok_or(MessageError::NoActiveUser)?;
        let listing = self
            .listing_by_id(listing_id)
            .ok_or(MessageError::ListingNotFound)?;

        let message = Message {
            id: Uuid::new_v4(),
            listing_id,
            listing_name: listing.name.clone(),
            buyer_id: buyer.id,
            buyer_name: buyer.name,
            buyer_handle: buyer.handle,
            seller_id: listing.seller_id,
            seller_name: listing.seller_name.clone(),
            seller_handle: listing.seller_handle.clone(),
            body: body.to_string(),
            sent_at: Utc::now(),
            read: false,
        };

        self.messages.insert(0, message.clone());
        self.persist_messages()?;
        info!(
            "message {} about '{}' from {} to {}",
            message.id, message.listing_name, message.buyer_name, message.seller_name
        );
        Ok(message)
    }

    /// Set the read flag. Unknown ids are a silent no-op.
    pub fn mark_read(&mut self, message_id: Uuid) -> anyhow::Result<()> {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            if !message.read {
                message.read = true;
                self.persist_messages()?;
            }
        }
        Ok(())
    }

    /// Every message addressed to this seller, in ledger order.
    pub fn inbox_for(&self, user: &User) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.seller_id == user.id)
            .collect()
    }

    /// Messages this account has sent as a buyer, in ledger order. The
    /// read flag reflects whether the seller has opened them.
    pub fn sent_for(&self, user: &User) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.buyer_id == user.id)
            .collect()
    }

    pub fn unread_count_for(&self, user: &User) -> usize {
        self.inbox_for(user).iter().filter(|m| !m.read).count()
    }

    /// Idempotent removal. Gated behind the admin surface.
    pub(crate) fn remove_message_record(&mut self, id: Uuid) -> anyhow::Result<()> {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        if self.messages.len() != before {
            self.persist_messages()?;
            info!("deleted message {}", id);
        }
        Ok(())
    }
}
