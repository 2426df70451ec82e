// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_REVOKED: &str = "session.revoked";
pub const SESSION_ACTIVE: &str = "session.active";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const GATE_REJECTED: &str = "auth.gate.rejected";
pub const ORDER_RECEIVED: &str = "order.received";
pub const BOOKING_RECEIVED: &str = "booking.received";
