/// Storage keys. One document per key, mirroring the original
/// browser-storage layout.

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const CURRENT_SESSION: &str = "current_session";
pub const LISTINGS: &str = "listings";
pub const FAVORITES: &str = "favorites";
pub const WISHLIST: &str = "wishlist";
pub const PURCHASES: &str = "purchases";
pub const OWN_LISTINGS: &str = "own_listings";
pub const CUSTOM_TAGS: &str = "custom_tags";
pub const MESSAGES: &str = "messages";
