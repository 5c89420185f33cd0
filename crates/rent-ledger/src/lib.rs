//! Rent ledger and arrears engine for the rental-management dashboard.
//!
//! The [`ledger`] module holds the core computation: reconstructing, month
//! by month, how much rent a tenancy owed and how much of it is covered by
//! the payments received so far, with payments always settling the oldest
//! outstanding obligation first. Everything around it is plumbing: config,
//! telemetry, the HTTP boundary, and a loader for normalized transaction
//! snapshots.

pub mod config;
pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod telemetry;
