//! Client side of a Spotify/YouTube download server: a page model with a
//! download trigger, menu chrome, and an HTTP transport to drive it.

pub mod chrome;
pub mod commands;
pub mod config;
pub mod dom;
pub mod errors;
pub mod page;
pub mod transport;
pub mod trigger;
pub mod utils;
pub mod validation;
