pub mod auth;
pub mod chatbot;
pub mod gemini;
pub mod knowledge;
