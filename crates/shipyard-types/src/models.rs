use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Accounts --

/// A registered account. The password is stored only as a PHC hash string —
/// the plaintext never reaches a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// External chat tag, `Name#1234`.
    pub handle: String,
    pub email: String,
    pub password_hash: String,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub login_count: u32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is live strictly before its expiry instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// -- Listings --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipCategory {
    Combat,
    Cargo,
    Mining,
    Exploration,
    Storage,
    Other,
}

impl ShipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipCategory::Combat => "combat",
            ShipCategory::Cargo => "cargo",
            ShipCategory::Mining => "mining",
            ShipCategory::Exploration => "exploration",
            ShipCategory::Storage => "storage",
            ShipCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "combat" => Some(ShipCategory::Combat),
            "cargo" => Some(ShipCategory::Cargo),
            "mining" => Some(ShipCategory::Mining),
            "exploration" => Some(ShipCategory::Exploration),
            "storage" => Some(ShipCategory::Storage),
            "other" => Some(ShipCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "in-person")]
    InPerson,
    #[serde(rename = "bank-transfer")]
    BankTransfer,
}

/// A marketplace listing. Seller name and handle are copied by value at
/// creation time; `seller_id` is the stable link back to the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    /// Smallest currency unit.
    pub price: u64,
    pub description: String,
    pub category: ShipCategory,
    /// Normalized tags, each with a single leading `@`.
    pub tags: Vec<String>,
    /// Encoded screenshot (data URL) or plain URL.
    pub image: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub seller_handle: String,
    pub created_at: DateTime<Utc>,
    pub blueprint_file: Option<String>,
    pub blueprint_image: Option<String>,
    pub payment_method: PaymentMethod,
}

// -- Messaging --

/// A buyer→seller message, bound to a listing. Names and handles are
/// denormalized copies; the ids are the stable identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_name: String,
    pub buyer_id: Uuid,
    pub buyer_name: String,
    pub buyer_handle: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub seller_handle: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

// -- Purchases --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub listing_name: String,
    pub price: u64,
    pub date: DateTime<Utc>,
}
