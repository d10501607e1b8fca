//! API Routes
//!
//! Route handlers organized by functionality.

pub mod actions;
pub mod auth;
pub mod events;
pub mod goals;
pub mod health;
pub mod overlays;
pub mod settings;
pub mod state;
