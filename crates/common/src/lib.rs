// ================
// common/src/lib.rs
// ================
//! Common types shared between the Spice Paradise browser client and server.
//! The cart lives in the browser's local storage; these are the shapes it
//! submits, plus the small JSON bodies the server answers with.

use serde::{Deserialize, Serialize};

/// One line of a cart order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (`price * quantity`)
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Order submitted from the cart page
///
/// `user_id` is never trusted from the client: the server overwrites it with
/// the id of the authenticated session before the order is recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub address: String,
    #[serde(default)]
    pub tip: f64,
    pub subtotal: f64,
    pub total: f64,
    pub items: Vec<CartItem>,
}

impl CartOrder {
    /// Number of individual dishes in the order
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Table booking form
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// Plain success body: `{"message": "..."}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Plain failure body: `{"error": "..."}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
