//! LINE echo relay: verifies webhook callbacks and replies to each text
//! message with the same text.

pub mod channels;
pub mod config;
pub mod echo;
pub mod gateway;
pub mod signature;
