use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "shipyard", about = "Local-first ship marketplace", version)]
pub struct Cli {
    /// Database path (overrides SHIPYARD_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        /// Chat tag, e.g. Froggy#1234
        #[arg(long)]
        handle: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the current session pointer
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Prune expired sessions
    Cleanup,
    /// List a ship for sale
    Add {
        #[arg(long)]
        name: String,
        /// Price in the smallest currency unit
        #[arg(long)]
        price: u64,
        #[arg(long, default_value = "")]
        description: String,
        /// combat | cargo | mining | exploration | storage | other
        #[arg(long)]
        category: String,
        /// Space-separated tags, e.g. "pvp fast"
        #[arg(long, default_value = "")]
        tags: String,
        /// Screenshot file to encode into the listing
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        blueprint_file: Option<PathBuf>,
        #[arg(long)]
        blueprint_image: Option<PathBuf>,
        /// in-person | bank-transfer
        #[arg(long, default_value = "in-person")]
        payment: String,
    },
    /// Search and filter listings
    Search {
        /// Free-text term over name and description
        #[arg(long, default_value = "")]
        term: String,
        #[arg(long)]
        category: Option<String>,
        /// Price range "min-max"; "+" for an open upper end, e.g. "5000-+"
        #[arg(long)]
        price: Option<String>,
        /// May repeat; a listing matches if it carries any of them
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Toggle a listing on the favorites list
    Favorite { listing: Uuid },
    /// Toggle a listing on the wishlist
    Wishlist { listing: Uuid },
    /// Add a custom search tag
    Tag { tag: String },
    /// Record a purchase of a listing
    Buy { listing: Uuid },
    /// Message the seller of a listing
    Contact {
        listing: Uuid,
        #[arg(long)]
        message: String,
    },
    /// Seller inbox
    Inbox {
        /// Mark this message read instead of listing
        #[arg(long)]
        mark_read: Option<Uuid>,
        /// Show messages you sent as a buyer instead
        #[arg(long)]
        sent: bool,
    },
    /// Export the account as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Operator commands
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Totals across users, listings and messages
    Overview,
    DeleteUser { id: Uuid },
    DeleteListing { id: Uuid },
    DeleteMessage { id: Uuid },
}
