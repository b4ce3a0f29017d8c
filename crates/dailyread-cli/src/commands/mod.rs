pub mod claims;
pub mod config;
pub mod interact;
pub mod plan;
pub mod reading;
pub mod sweep;
pub mod user;
