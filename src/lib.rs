//! Storefront State Library
//!
//! This library keeps the shopping cart and the product-list filters in sync
//! with their external string forms (a durable storage mirror and the URL
//! query string), plus a small HTTP surface that exposes both.

// Domain modules
pub mod cart;
pub mod catalog;
pub mod filters;

// Shared plumbing
pub mod config;
pub mod error;
pub mod storage;

// Infrastructure
pub mod router;
pub mod state;
