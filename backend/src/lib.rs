//! # Rapport
//!
//! Backend for keeping personal relationships healthy: contacts, families,
//! invite groups, the interactions you have with them, and the recurring
//! events you host for them.
//!
//! ## Features
//!
//! - **Recurrence**: expand "every 2nd Friday" or "day 15 of each month" into
//!   concrete dated slots over a rolling horizon
//! - **Slot generation**: idempotent materialization of those slots, plus
//!   invitations that track each slot's remaining capacity
//! - **Relationship scores**: an explainable 0-100 health score from
//!   recency, frequency and variety of interactions, with a dampened
//!   fallback for groups
//! - **Reminders**: one-off or repeating to-dos that roll forward on completion
//! - **Attention dashboard**: upcoming birthdays, contacts gone quiet,
//!   upcoming slots and due reminders
//! - **HTTP API**: JSON endpoints over all of the above
//!
//! ## Architecture
//!
//! - [`models`]: domain types shared across the crate
//! - [`time`]: calendar arithmetic
//! - [`services`]: pure recurrence, scoring and dashboard logic
//! - [`db`]: repository traits, the in-memory and SQLite stores, and the
//!   service layer that ties them to the pure logic
//! - [`config`]: `rapport.toml` loading
//! - `http`: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod time;

#[cfg(feature = "http-server")]
pub mod http;
