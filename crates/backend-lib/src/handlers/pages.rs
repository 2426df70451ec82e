// ============================
// crates/backend-lib/src/handlers/pages.rs
// ============================
//! Public pages. None of these need a session; the navigation bar shows the
//! user when there is one.
use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use metrics::counter;
use spice_common::BookingRequest;
use tracing::info;

use crate::metrics as keys;
use crate::middleware::MaybeIdentity;
use crate::views::{self, Flash, PageContext};

pub async fn home(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Html<String> {
    views::home(&PageContext::new(identity, flash))
}

pub async fn menu(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Html<String> {
    views::menu(&PageContext::new(identity, flash))
}

pub async fn contact(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Html<String> {
    views::contact(&PageContext::new(identity, flash))
}

pub async fn cart(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Html<String> {
    views::cart(&PageContext::new(identity, flash))
}

pub async fn booking_page(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Html<String> {
    views::booking(&PageContext::new(identity, flash), None)
}

/// Record a table booking. Bookings are only logged, not stored.
pub async fn booking(
    MaybeIdentity(identity): MaybeIdentity,
    Form(booking): Form<BookingRequest>,
) -> Html<String> {
    counter!(keys::BOOKING_RECEIVED).increment(1);
    info!(
        name = %booking.name,
        email = %booking.email,
        phone = %booking.phone,
        date = %booking.date,
        time = %booking.time,
        "new booking"
    );
    let ctx = PageContext {
        identity,
        ..Default::default()
    };
    views::booking(&ctx, Some(&booking))
}

pub async fn not_found(MaybeIdentity(identity): MaybeIdentity) -> Response {
    let ctx = PageContext {
        identity,
        ..Default::default()
    };
    (StatusCode::NOT_FOUND, views::not_found(&ctx)).into_response()
}
