use std::collections::HashMap;

use anyhow::{bail, Result};
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::keys;

/// Current document schema version. Version 1 is the shape the original
/// marketplace kept in browser storage: camelCase fields, integer
/// millisecond ids, `discord` handles, references by display name.
pub const SCHEMA_VERSION: i64 = 2;

/// Version-1 storage keys and their canonical replacements.
const LEGACY_KEY_RENAMES: &[(&str, &str)] = &[
    ("registeredUsers", keys::USERS),
    ("ships", keys::LISTINGS),
    ("userFavorites", keys::FAVORITES),
    ("userWishlist", keys::WISHLIST),
    ("userPurchases", keys::PURCHASES),
    ("userListings", keys::OWN_LISTINGS),
    ("customSearchTags", keys::CUSTOM_TAGS),
];

/// Version-1 login-state keys with no upgrade path. v1 persisted a snapshot
/// of the logged-in user rather than a session pointer; the upgrade is a
/// forced re-login.
const LEGACY_DROPPED: &[&str] = &["currentUser", "currentSession", "userSessions"];

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            key         TEXT PRIMARY KEY,
            version     INTEGER NOT NULL,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    upgrade_documents(conn)?;

    info!("Store migrations complete");
    Ok(())
}

/// One-shot upgrade pass run at open. Every stored document leaves this
/// function at SCHEMA_VERSION or the open fails.
fn upgrade_documents(conn: &Connection) -> Result<()> {
    let mut rows: Vec<(String, i64, Value)> = {
        let mut stmt = conn.prepare("SELECT key, version, value FROM documents")?;
        let mapped = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })?;
        let mut out = Vec::new();
        for r in mapped {
            let (key, version, raw) = r?;
            let value: Value = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("corrupt document '{}': {}", key, e))?;
            out.push((key, version, value));
        }
        out
    };

    for (key, version, _) in &rows {
        if *version > SCHEMA_VERSION {
            bail!(
                "document '{}' has schema version {} but this build understands {}",
                key,
                version,
                SCHEMA_VERSION
            );
        }
    }

    if rows.iter().all(|(_, v, _)| *v == SCHEMA_VERSION) {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;

    for &key in LEGACY_DROPPED {
        if let Some(pos) = rows
            .iter()
            .position(|(k, v, _)| k == key && *v < SCHEMA_VERSION)
        {
            warn!("dropping legacy '{}' document; login state resets on upgrade", key);
            tx.execute("DELETE FROM documents WHERE key = ?1", [key])?;
            rows.remove(pos);
        }
    }

    // First pass: assign stable ids so numeric references can be rewritten.
    let mut user_ids: HashMap<String, Uuid> = HashMap::new();
    let mut listing_ids: HashMap<i64, Uuid> = HashMap::new();
    for (key, version, value) in &rows {
        if *version == SCHEMA_VERSION {
            continue;
        }
        match canonical_key(key) {
            keys::USERS => {
                if let Some(users) = value.as_array() {
                    for u in users {
                        if let Some(name) = u.get("name").and_then(Value::as_str) {
                            user_ids.insert(name.to_string(), Uuid::new_v4());
                        }
                    }
                }
            }
            keys::LISTINGS => {
                if let Some(listings) = value.as_array() {
                    for l in listings {
                        if let Some(old) = l.get("id").and_then(Value::as_i64) {
                            listing_ids.insert(old, Uuid::new_v4());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // Second pass: rewrite each legacy document and store it under its
    // canonical key at the current version.
    for (key, version, value) in &rows {
        if *version == SCHEMA_VERSION {
            continue;
        }
        let canonical = canonical_key(key);
        let upgraded = match canonical {
            keys::USERS => upgrade_users(value, &user_ids),
            keys::LISTINGS => upgrade_listings(value, &user_ids, &listing_ids),
            keys::MESSAGES => upgrade_messages(value, &user_ids, &listing_ids),
            keys::FAVORITES | keys::WISHLIST | keys::OWN_LISTINGS => {
                upgrade_id_list(key, value, &listing_ids)
            }
            keys::PURCHASES => upgrade_purchases(value),
            keys::CUSTOM_TAGS => value.clone(),
            other => {
                warn!("no upgrade path for legacy document '{}'; dropping it", other);
                tx.execute("DELETE FROM documents WHERE key = ?1", [key.as_str()])?;
                continue;
            }
        };

        if canonical != key.as_str() {
            tx.execute("DELETE FROM documents WHERE key = ?1", [key.as_str()])?;
        }
        tx.execute(
            "INSERT INTO documents (key, version, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET version = ?2, value = ?3,
                 updated_at = datetime('now')",
            rusqlite::params![canonical, SCHEMA_VERSION, upgraded.to_string()],
        )?;
        info!("upgraded document '{}' from v{} to v{}", key, version, SCHEMA_VERSION);
    }

    tx.commit()?;
    Ok(())
}

fn canonical_key(key: &str) -> &str {
    LEGACY_KEY_RENAMES
        .iter()
        .find(|(old, _)| *old == key)
        .map(|(_, new)| *new)
        .unwrap_or(key)
}

fn field(obj: &Value, name: &str) -> Value {
    obj.get(name).cloned().unwrap_or(Value::Null)
}

fn upgrade_users(value: &Value, user_ids: &HashMap<String, Uuid>) -> Value {
    let users = match value.as_array() {
        Some(a) => a,
        None => return json!([]),
    };
    let upgraded: Vec<Value> = users
        .iter()
        .map(|u| {
            let name = u.get("name").and_then(Value::as_str).unwrap_or("");
            let id = user_ids.get(name).copied().unwrap_or_else(Uuid::new_v4);
            json!({
                "id": id,
                "name": name,
                "handle": field(u, "discord"),
                "email": field(u, "email"),
                // v1 stored the legacy integer digest here; it never parses
                // as a PHC string, so these accounts verify as bad-password.
                "password_hash": u.get("password").cloned().unwrap_or(json!("")),
                "joined_at": field(u, "joinDate"),
                // later v1 revisions tracked login state; carry it when present
                "last_login": field(u, "lastLogin"),
                "login_count": u.get("loginCount").and_then(Value::as_u64).unwrap_or(0),
                "active": u.get("active").and_then(Value::as_bool).unwrap_or(true),
            })
        })
        .collect();
    if !upgraded.is_empty() {
        warn!(
            "{} account(s) carry a legacy password digest and cannot log in; \
             an operator must delete them so the owner can re-register",
            upgraded.len()
        );
    }
    Value::Array(upgraded)
}

fn upgrade_listings(
    value: &Value,
    user_ids: &HashMap<String, Uuid>,
    listing_ids: &HashMap<i64, Uuid>,
) -> Value {
    let listings = match value.as_array() {
        Some(a) => a,
        None => return json!([]),
    };
    let upgraded: Vec<Value> = listings
        .iter()
        .map(|l| {
            let old_id = l.get("id").and_then(Value::as_i64).unwrap_or(0);
            let id = listing_ids.get(&old_id).copied().unwrap_or_else(Uuid::new_v4);
            let seller = l.get("seller").and_then(Value::as_str).unwrap_or("");
            let seller_id = user_ids.get(seller).copied().unwrap_or_else(Uuid::new_v4);
            let blueprint_file = match l.get("blueprintFile").and_then(Value::as_str) {
                Some("") | None => Value::Null,
                Some(f) => json!(f),
            };
            json!({
                "id": id,
                "name": field(l, "name"),
                "price": l.get("price").and_then(Value::as_u64).unwrap_or(0),
                "description": field(l, "description"),
                "category": l.get("category").cloned().unwrap_or(json!("other")),
                "tags": l.get("tags").cloned().unwrap_or(json!([])),
                "image": l.get("image").cloned().unwrap_or(json!("")),
                "seller_id": seller_id,
                "seller_name": seller,
                "seller_handle": field(l, "discord"),
                "created_at": field(l, "dateAdded"),
                "blueprint_file": blueprint_file,
                "blueprint_image": field(l, "blueprintImage"),
                "payment_method": l.get("paymentMethod").cloned().unwrap_or(json!("in-person")),
            })
        })
        .collect();
    Value::Array(upgraded)
}

fn upgrade_messages(
    value: &Value,
    user_ids: &HashMap<String, Uuid>,
    listing_ids: &HashMap<i64, Uuid>,
) -> Value {
    let messages = match value.as_array() {
        Some(a) => a,
        None => return json!([]),
    };
    let upgraded: Vec<Value> = messages
        .iter()
        .map(|m| {
            let buyer = m.get("buyerName").and_then(Value::as_str).unwrap_or("");
            let seller = m.get("sellerName").and_then(Value::as_str).unwrap_or("");
            let old_listing = m.get("shipId").and_then(Value::as_i64).unwrap_or(0);
            json!({
                "id": Uuid::new_v4(),
                "listing_id": listing_ids
                    .get(&old_listing)
                    .copied()
                    .unwrap_or_else(Uuid::new_v4),
                "listing_name": field(m, "shipName"),
                "buyer_id": user_ids.get(buyer).copied().unwrap_or_else(Uuid::new_v4),
                "buyer_name": buyer,
                "buyer_handle": field(m, "buyerDiscord"),
                "seller_id": user_ids.get(seller).copied().unwrap_or_else(Uuid::new_v4),
                "seller_name": seller,
                "seller_handle": field(m, "sellerDiscord"),
                "body": field(m, "message"),
                "sent_at": field(m, "timestamp"),
                "read": m.get("read").and_then(Value::as_bool).unwrap_or(false),
            })
        })
        .collect();
    Value::Array(upgraded)
}

fn upgrade_id_list(key: &str, value: &Value, listing_ids: &HashMap<i64, Uuid>) -> Value {
    let ids = match value.as_array() {
        Some(a) => a,
        None => return json!([]),
    };
    let upgraded: Vec<Value> = ids
        .iter()
        .filter_map(|v| {
            let old = v.as_i64()?;
            match listing_ids.get(&old) {
                Some(id) => Some(json!(id)),
                None => {
                    warn!("'{}' references unknown listing {}; dropping entry", key, old);
                    None
                }
            }
        })
        .collect();
    Value::Array(upgraded)
}

fn upgrade_purchases(value: &Value) -> Value {
    let purchases = match value.as_array() {
        Some(a) => a,
        None => return json!([]),
    };
    let upgraded: Vec<Value> = purchases
        .iter()
        .map(|p| {
            json!({
                "listing_name": field(p, "shipName"),
                "price": p.get("price").and_then(Value::as_u64).unwrap_or(0),
                "date": field(p, "date"),
            })
        })
        .collect();
    Value::Array(upgraded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with(key: &str, version: i64, value: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE documents (
                key TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO documents (key, version, value) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, version, value],
        )
        .unwrap();
        conn
    }

    fn doc(conn: &Connection, key: &str) -> Option<(i64, Value)> {
        conn.query_row(
            "SELECT version, value FROM documents WHERE key = ?1",
            [key],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .map(|(v, raw)| (v, serde_json::from_str(&raw).unwrap()))
        .ok()
    }

    #[test]
    fn upgrades_v1_users_document() {
        let conn = conn_with(
            "registeredUsers",
            1,
            r#"[{"id": 1700000000000, "name": "Froggy", "discord": "Froggy#1234",
                 "email": "froggy@example.com", "password": "48291",
                 "joinDate": "2024-01-01T00:00:00Z"}]"#,
        );
        run(&conn).unwrap();

        assert!(doc(&conn, "registeredUsers").is_none());
        let (version, users) = doc(&conn, keys::USERS).unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let u = &users.as_array().unwrap()[0];
        assert_eq!(u["name"], "Froggy");
        assert_eq!(u["handle"], "Froggy#1234");
        assert_eq!(u["password_hash"], "48291");
        assert_eq!(u["login_count"], 0);
        assert_eq!(u["last_login"], Value::Null);
        assert_eq!(u["active"], true);
        assert!(Uuid::parse_str(u["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn carries_v1_login_state_when_present() {
        let conn = conn_with(
            "registeredUsers",
            1,
            r#"[{"id": 1700000000000, "name": "Froggy", "discord": "Froggy#1234",
                 "email": "froggy@example.com", "password": "48291",
                 "joinDate": "2024-01-01T00:00:00Z",
                 "lastLogin": "2024-03-01T12:00:00Z", "loginCount": 7,
                 "active": false},
                {"id": 1700000000001, "name": "Bea", "discord": "Bea#0002",
                 "email": "bea@example.com", "password": "12345",
                 "joinDate": "2024-01-02T00:00:00Z"}]"#,
        );
        run(&conn).unwrap();

        let (_, users) = doc(&conn, keys::USERS).unwrap();
        let users = users.as_array().unwrap();
        assert_eq!(users[0]["last_login"], "2024-03-01T12:00:00Z");
        assert_eq!(users[0]["login_count"], 7);
        assert_eq!(users[0]["active"], false);
        // accounts without the later fields fall back to a fresh state
        assert_eq!(users[1]["last_login"], Value::Null);
        assert_eq!(users[1]["login_count"], 0);
        assert_eq!(users[1]["active"], true);
    }

    #[test]
    fn rewrites_favorite_references_through_listing_ids() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE documents (
                key TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO documents (key, version, value) VALUES
                ('ships', 1, ?1), ('userFavorites', 1, '[42, 99]')",
            [r#"[{"id": 42, "name": "Raven", "price": 2500, "description": "",
                  "category": "combat", "tags": ["@pvp"], "image": "",
                  "seller": "Ada", "discord": "Ada#0001",
                  "dateAdded": "2024-02-02T00:00:00Z"}]"#],
        )
        .unwrap();
        run(&conn).unwrap();

        let (_, listings) = doc(&conn, keys::LISTINGS).unwrap();
        let listing_id = listings.as_array().unwrap()[0]["id"].clone();
        let (_, favorites) = doc(&conn, keys::FAVORITES).unwrap();

        // the dangling id 99 is dropped, 42 follows the listing's new id
        assert_eq!(favorites.as_array().unwrap().len(), 1);
        assert_eq!(favorites.as_array().unwrap()[0], listing_id);
        let (_, listing) = doc(&conn, keys::LISTINGS).unwrap();
        assert_eq!(listing.as_array().unwrap()[0]["payment_method"], "in-person");
    }

    #[test]
    fn drops_legacy_login_state() {
        let conn = conn_with("currentUser", 1, r#"{"name": "Froggy"}"#);
        run(&conn).unwrap();
        assert!(doc(&conn, "currentUser").is_none());
        assert!(doc(&conn, keys::CURRENT_SESSION).is_none());
    }

    #[test]
    fn rejects_documents_from_the_future() {
        let conn = conn_with(keys::USERS, 3, "[]");
        assert!(run(&conn).is_err());
    }

    #[test]
    fn current_version_documents_pass_untouched() {
        let conn = conn_with(keys::CUSTOM_TAGS, SCHEMA_VERSION, r#"["@pvp"]"#);
        run(&conn).unwrap();
        let (version, tags) = doc(&conn, keys::CUSTOM_TAGS).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(tags, json!(["@pvp"]));
    }
}
