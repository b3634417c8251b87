use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, Purchase};

pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Profile as it appears in an account export — everything on the account
/// record except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedProfile {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub login_count: u32,
}

/// Self-contained account export document. Round-trips through serde_json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountExport {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub profile: ExportedProfile,
    pub favorites: Vec<Uuid>,
    pub wishlist: Vec<Uuid>,
    pub purchases: Vec<Purchase>,
    pub custom_tags: Vec<String>,
    /// Messages where the profile owner is buyer or seller, in ledger order.
    pub messages: Vec<Message>,
}
