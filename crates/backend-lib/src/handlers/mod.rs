//! HTTP handlers.

pub mod auth;
pub mod orders;
pub mod pages;
