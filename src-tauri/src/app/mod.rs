//! Host-side application state and event adapters.

pub mod events;
pub mod state;

pub use state::AppState;
