pub mod auth;
pub mod chat;
pub mod documents;
pub mod faqs;
pub mod history;
