pub mod auth;
pub mod orders;
pub mod riders;
pub mod sessions;
pub mod settings;
pub mod tables;
