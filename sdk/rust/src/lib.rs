//! Client for the Caddy config injector's route-add API.

pub mod client;

pub use client::{periodically, InjectorClient};
