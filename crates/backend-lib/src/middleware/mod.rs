// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the Spice Paradise server.

pub mod gate;

pub use gate::{
    require_session, AccessGate, ClientKind, Denial, DenyReason, GateDecision, Identity,
    MaybeIdentity,
};

#[cfg(test)]
mod tests;
