pub mod export;
pub mod models;
