mod client;
mod state_code;

pub use client::{Client, ClientId, NewClient};
pub use state_code::{normalize as normalize_state_code, STATE_CODES};
