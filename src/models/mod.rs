pub mod news;
pub mod settings;
pub mod user;
