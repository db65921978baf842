//! Authorization and moderation core for the business directory.
//!
//! [`access`] answers who may do what to which resource, and [`moderation`]
//! drives the review workflow for submitted content.

pub mod access;
pub mod config;
pub mod error;
pub mod moderation;
pub mod telemetry;
