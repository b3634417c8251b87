//! Listing catalog: creation, the derived tag index, and the per-profile
//! preference sets (favorites, wishlist, own listings, custom search tags).

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shipyard_types::models::{Listing, PaymentMethod, Purchase, ShipCategory, User};

use crate::app::App;
use crate::error::CatalogError;

pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// Listing input as it comes off the form, before ids, timestamps and
/// seller identity are attached.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub name: String,
    pub price: u64,
    pub description: String,
    pub category: ShipCategory,
    /// Raw space-separated tag input.
    pub tags: String,
    /// Already-encoded image payload (data URL) or a plain URL.
    pub image: String,
    pub blueprint_file: Option<String>,
    pub blueprint_image: Option<String>,
    pub payment_method: PaymentMethod,
}

/// Trim, drop empty tokens, and force a single leading `@` on each tag.
pub fn normalize_tags(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .map(|tag| {
            let tag = tag.trim();
            if tag.starts_with('@') {
                tag.to_string()
            } else {
                format!("@{}", tag)
            }
        })
        .filter(|tag| tag.len() > 1)
        .collect()
}

/// Normalize one tag for use as a filter term; empty input stays empty.
pub fn normalize_tag(input: &str) -> String {
    normalize_tags(input).into_iter().next().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesStats {
    pub listed: usize,
    pub revenue: u64,
}

impl App {
    /// Build the full listing from a draft and insert it at the front —
    /// unfiltered display order is most-recent-first by construction.
    pub fn add_listing(
        &mut self,
        draft: ListingDraft,
        owner: &User,
    ) -> Result<Listing, CatalogError> {
        let description = if draft.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            draft.description
        };

        let listing = Listing {
            id: Uuid::new_v4(),
            name: draft.name,
            price: draft.price,
            description,
            category: draft.category,
            tags: normalize_tags(&draft.tags),
            image: draft.image,
            seller_id: owner.id,
            seller_name: owner.name.clone(),
            seller_handle: owner.handle.clone(),
            created_at: Utc::now(),
            blueprint_file: draft.blueprint_file,
            blueprint_image: draft.blueprint_image,
            payment_method: draft.payment_method,
        };

        self.listings.insert(0, listing.clone());
        self.own_listings.insert(0, listing.id);
        self.persist_listings()?;
        self.persist_own_listings()?;
        info!("listed '{}' ({}) by {}", listing.name, listing.id, listing.seller_name);
        Ok(listing)
    }

    /// Idempotent removal. Gated behind the admin surface.
    pub(crate) fn remove_listing_record(&mut self, id: Uuid) -> anyhow::Result<()> {
        let before = self.listings.len();
        self.listings.retain(|l| l.id != id);
        if self.listings.len() != before {
            self.persist_listings()?;
            info!("deleted listing {}", id);
        }
        Ok(())
    }

    /// Union of all tags currently on listings, recomputed on demand.
    pub fn tag_index(&self) -> BTreeSet<String> {
        self.listings
            .iter()
            .flat_map(|l| l.tags.iter().cloned())
            .collect()
    }

    /// Returns true when the listing ends up favorited.
    pub fn toggle_favorite(&mut self, listing_id: Uuid) -> Result<bool, CatalogError> {
        self.active_user().ok_or(CatalogError::NoActiveUser)?;
        let added = match self.favorites.iter().position(|id| *id == listing_id) {
            Some(pos) => {
                self.favorites.remove(pos);
                false
            }
            None => {
                self.favorites.push(listing_id);
                true
            }
        };
        self.persist_favorites()?;
        Ok(added)
    }

    /// Returns true when the listing ends up on the wishlist.
    pub fn toggle_wishlist(&mut self, listing_id: Uuid) -> Result<bool, CatalogError> {
        self.active_user().ok_or(CatalogError::NoActiveUser)?;
        let added = match self.wishlist.iter().position(|id| *id == listing_id) {
            Some(pos) => {
                self.wishlist.remove(pos);
                false
            }
            None => {
                self.wishlist.push(listing_id);
                true
            }
        };
        self.persist_wishlist()?;
        Ok(added)
    }

    /// Custom search tags seed filter affordances independently of the tag
    /// index; they may name tags no listing carries. Returns false for
    /// empty or duplicate input.
    pub fn add_custom_tag(&mut self, tag: &str) -> anyhow::Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() || self.custom_tags.contains(tag) {
            return Ok(false);
        }
        self.custom_tags.insert(tag.to_string());
        self.persist_custom_tags()?;
        Ok(true)
    }

    pub fn record_purchase(&mut self, listing_id: Uuid) -> Result<Purchase, CatalogError> {
        self.active_user().ok_or(CatalogError::NoActiveUser)?;
        let listing = self
            .listing_by_id(listing_id)
            .ok_or(CatalogError::ListingNotFound)?;
        let purchase = Purchase {
            listing_name: listing.name.clone(),
            price: listing.price,
            date: Utc::now(),
        };
        self.purchases.insert(0, purchase.clone());
        self.persist_purchases()?;
        Ok(purchase)
    }

    pub fn my_listings_for(&self, user: &User) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| l.seller_id == user.id)
            .collect()
    }

    pub fn sales_stats_for(&self, user: &User) -> SalesStats {
        let mine = self.my_listings_for(user);
        SalesStats {
            listed: mine.len(),
            revenue: mine.iter().map(|l| l.price).sum(),
        }
    }
}
