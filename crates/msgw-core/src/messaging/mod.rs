//! Cross-provider messaging abstractions (Telegram and MAX today).

pub mod builder;
pub mod callbacks;
pub mod port;
pub mod types;
