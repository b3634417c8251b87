pub mod accounts;
pub mod admin;
pub mod app;
pub mod catalog;
pub mod encode;
pub mod error;
pub mod export;
pub mod filter;
pub mod messaging;
pub mod notify;
pub mod password;
pub mod session;
pub mod validation;

pub use app::App;
