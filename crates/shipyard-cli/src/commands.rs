use std::path::Path;

use anyhow::{bail, Context, Result};

use shipyard_core::catalog::ListingDraft;
use shipyard_core::encode;
use shipyard_core::error::AuthError;
use shipyard_core::filter::{filter_listings, FilterCriteria, PriceRange};
use shipyard_core::notify::{Notifier, Severity};
use shipyard_core::App;
use shipyard_types::models::{PaymentMethod, ShipCategory, User};

use crate::cli::{AdminCommand, Command};

pub fn dispatch(app: &mut App, notifier: &dyn Notifier, command: Command) -> Result<()> {
    match command {
        Command::Register { name, handle, email, password } => {
            let user = match app.register(&name, &handle, &email, &password) {
                Ok(user) => user,
                Err(e) => {
                    notifier.notify("Registration failed", &e.to_string(), Severity::Error);
                    bail!("registration failed");
                }
            };
            // registration logs the new account in
            app.create_session(user.id)?;
            notifier.notify(
                "Welcome aboard!",
                &format!("Account created for {}. You are now logged in.", user.name),
                Severity::Success,
            );
            Ok(())
        }

        Command::Login { email, password } => {
            let user = match app.authenticate(&email, &password) {
                Ok(user) => user,
                // one combined message; the distinction stays internal
                Err(AuthError::NotFound) | Err(AuthError::BadPassword) => {
                    notifier.notify(
                        "Login failed",
                        "Invalid email or password.",
                        Severity::Error,
                    );
                    bail!("login failed");
                }
                Err(AuthError::Storage(e)) => return Err(e),
            };
            app.create_session(user.id)?;
            notifier.notify(
                "Login successful",
                &format!("Welcome back, {}!", user.name),
                Severity::Success,
            );
            Ok(())
        }

        Command::Logout => {
            app.logout()?;
            notifier.notify("Logged out", "See you next time.", Severity::Info);
            Ok(())
        }

        Command::Whoami => {
            match app.resolve_current_user()? {
                Some(user) => {
                    let role = if app.is_admin(&user) { " (admin)" } else { "" };
                    println!("{} <{}> {}{}", user.name, user.email, user.handle, role);
                }
                None => println!("not logged in"),
            }
            Ok(())
        }

        Command::Cleanup => {
            let pruned = app.cleanup_expired()?;
            println!("pruned {} expired sessions", pruned);
            Ok(())
        }

        Command::Add {
            name,
            price,
            description,
            category,
            tags,
            image,
            blueprint_file,
            blueprint_image,
            payment,
        } => {
            let owner = require_login(app)?;
            let category = ShipCategory::parse(&category)
                .with_context(|| format!("unknown category '{}'", category))?;
            let payment_method = parse_payment(&payment)?;

            // encode uploads before touching any state; a failed encode
            // aborts the add with nothing inserted
            let image = match &image {
                Some(path) => encode_or_notify(path, notifier)?,
                None => String::new(),
            };
            let blueprint_image = match &blueprint_image {
                Some(path) => Some(encode_or_notify(path, notifier)?),
                None => None,
            };
            let blueprint_file = blueprint_file.map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            });

            let listing = app.add_listing(
                ListingDraft {
                    name,
                    price,
                    description,
                    category,
                    tags,
                    image,
                    blueprint_file,
                    blueprint_image,
                    payment_method,
                },
                &owner,
            )?;
            notifier.notify(
                "Ship listed!",
                &format!("'{}' is now on the marketplace ({}).", listing.name, listing.id),
                Severity::Success,
            );
            Ok(())
        }

        Command::Search { term, category, price, tags } => {
            let category = match category {
                Some(raw) => Some(
                    ShipCategory::parse(&raw)
                        .with_context(|| format!("unknown category '{}'", raw))?,
                ),
                None => None,
            };
            let criteria = FilterCriteria {
                search_term: term,
                category,
                price_range: price.as_deref().and_then(PriceRange::parse),
                active_tags: tags
                    .iter()
                    .map(|t| shipyard_core::catalog::normalize_tag(t))
                    .filter(|t| !t.is_empty())
                    .collect(),
            };

            let hits = filter_listings(app.listings(), &criteria);
            println!("{} of {} listings", hits.len(), app.listings().len());
            for listing in hits {
                println!(
                    "{}  {:<20} {:>8}  {:<12} by {} ({})  {}",
                    listing.id,
                    listing.name,
                    listing.price,
                    listing.category.as_str(),
                    listing.seller_name,
                    listing.seller_handle,
                    listing.tags.join(" "),
                );
            }
            Ok(())
        }

        Command::Favorite { listing } => {
            let added = app.toggle_favorite(listing)?;
            println!("{}", if added { "favorited" } else { "unfavorited" });
            Ok(())
        }

        Command::Wishlist { listing } => {
            let added = app.toggle_wishlist(listing)?;
            println!("{}", if added { "added to wishlist" } else { "removed from wishlist" });
            Ok(())
        }

        Command::Tag { tag } => {
            let tag = shipyard_core::catalog::normalize_tag(&tag);
            if app.add_custom_tag(&tag)? {
                println!("added {}", tag);
            } else {
                println!("already present");
            }
            Ok(())
        }

        Command::Buy { listing } => {
            let purchase = app.record_purchase(listing)?;
            notifier.notify(
                "Purchase recorded",
                &format!("'{}' for {}.", purchase.listing_name, purchase.price),
                Severity::Success,
            );
            Ok(())
        }

        Command::Contact { listing, message } => {
            match app.send_message(listing, &message) {
                Ok(sent) => {
                    notifier.notify(
                        "Message sent!",
                        &format!("{} will see it in their dashboard.", sent.seller_name),
                        Severity::Success,
                    );
                    Ok(())
                }
                Err(e) => {
                    notifier.notify("Message not sent", &e.to_string(), Severity::Error);
                    bail!("message not sent");
                }
            }
        }

        Command::Inbox { mark_read, sent } => {
            let user = require_login(app)?;
            if let Some(id) = mark_read {
                app.mark_read(id)?;
            }
            if sent {
                let sent = app.sent_for(&user);
                println!("{} sent messages", sent.len());
                for message in sent {
                    println!(
                        "{} [{}] to {} ({}) about '{}': {}",
                        message.id,
                        if message.read { "read" } else { "new " },
                        message.seller_name,
                        message.seller_handle,
                        message.listing_name,
                        message.body,
                    );
                }
            } else {
                let inbox = app.inbox_for(&user);
                println!("{} messages, {} unread", inbox.len(), app.unread_count_for(&user));
                for message in inbox {
                    println!(
                        "{} [{}] {} ({}) about '{}': {}",
                        message.id,
                        if message.read { "read" } else { "new " },
                        message.buyer_name,
                        message.buyer_handle,
                        message.listing_name,
                        message.body,
                    );
                }
            }
            Ok(())
        }

        Command::Export { out } => {
            let user = require_login(app)?;
            let json = app.export_account_json(&user)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }

        Command::Admin(command) => {
            let admin = require_login(app)?;
            match command {
                AdminCommand::Overview => {
                    let overview = app.admin_overview(&admin)?;
                    println!("users:           {}", overview.total_users);
                    println!("listings:        {}", overview.total_listings);
                    println!("messages:        {}", overview.total_messages);
                    println!("active listings: {}", overview.active_listings);
                }
                AdminCommand::DeleteUser { id } => {
                    app.admin_delete_user(&admin, id)?;
                    println!("user deleted");
                }
                AdminCommand::DeleteListing { id } => {
                    app.admin_delete_listing(&admin, id)?;
                    println!("listing deleted");
                }
                AdminCommand::DeleteMessage { id } => {
                    app.admin_delete_message(&admin, id)?;
                    println!("message deleted");
                }
            }
            Ok(())
        }
    }
}

fn require_login(app: &mut App) -> Result<User> {
    app.resolve_current_user()?
        .context("not logged in (run `shipyard login` first)")
}

fn parse_payment(raw: &str) -> Result<PaymentMethod> {
    match raw {
        "in-person" => Ok(PaymentMethod::InPerson),
        "bank-transfer" => Ok(PaymentMethod::BankTransfer),
        other => bail!("unknown payment method '{}'", other),
    }
}

fn encode_or_notify(path: &Path, notifier: &dyn Notifier) -> Result<String> {
    match encode::encode_file(path) {
        Ok(url) => Ok(url),
        Err(e) => {
            notifier.notify(
                "Upload error",
                "Failed to process image file. Please try again.",
                Severity::Error,
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_core::notify::RecordingNotifier;
    use shipyard_store::Store;

    fn app() -> App {
        App::load(Store::open_in_memory().unwrap(), None).unwrap()
    }

    fn register(email: &str) -> Command {
        Command::Register {
            name: "Ada".into(),
            handle: "Ada#0001".into(),
            email: email.into(),
            password: "Str0ng!pass".into(),
        }
    }

    #[test]
    fn register_notifies_success_and_logs_in() {
        let mut app = app();
        let notifier = RecordingNotifier::default();
        dispatch(&mut app, &notifier, register("ada@x.com")).unwrap();

        let entries = notifier.entries.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "Welcome aboard!");
        assert_eq!(entries[0].2, Severity::Success);
        drop(entries);
        assert!(app.active_user().is_some());
    }

    #[test]
    fn failed_login_reads_the_same_for_bad_password_and_unknown_email() {
        let mut app = app();
        let notifier = RecordingNotifier::default();
        dispatch(&mut app, &notifier, register("ada@x.com")).unwrap();

        let wrong_password = Command::Login {
            email: "ada@x.com".into(),
            password: "nope".into(),
        };
        assert!(dispatch(&mut app, &notifier, wrong_password).is_err());
        let unknown_email = Command::Login {
            email: "ghost@x.com".into(),
            password: "nope".into(),
        };
        assert!(dispatch(&mut app, &notifier, unknown_email).is_err());

        let entries = notifier.entries.borrow();
        let failures: Vec<_> = entries
            .iter()
            .filter(|(title, _, _)| title == "Login failed")
            .collect();
        assert_eq!(failures.len(), 2);
        for (_, body, severity) in failures {
            assert_eq!(body, "Invalid email or password.");
            assert_eq!(*severity, Severity::Error);
        }
    }
}
