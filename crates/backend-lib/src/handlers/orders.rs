// ============================
// crates/backend-lib/src/handlers/orders.rs
// ============================
//! Cart order submission (gated).
use axum::{extract::rejection::JsonRejection, Json};
use metrics::counter;
use spice_common::{CartOrder, MessageBody};
use tracing::info;

use crate::error::AppError;
use crate::metrics as keys;
use crate::middleware::Identity;

/// Accept an order from the cart page.
///
/// The user id always comes from the session, never from the body. Orders are
/// logged, not persisted.
pub async fn submit_cart(
    identity: Identity,
    payload: Result<Json<CartOrder>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(mut order) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    order.user_id = Some(identity.user_id);

    counter!(keys::ORDER_RECEIVED).increment(1);
    info!(
        user_id = identity.user_id,
        username = %identity.username,
        address = %order.address,
        tip = order.tip,
        subtotal = order.subtotal,
        total = order.total,
        items = order.item_count(),
        "new order received"
    );
    for item in &order.items {
        info!(
            name = %item.name,
            quantity = item.quantity,
            price = item.price,
            "order item"
        );
    }

    Ok(Json(MessageBody::new("Order received successfully!")))
}
