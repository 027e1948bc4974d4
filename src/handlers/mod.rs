//! HTTP handlers

pub mod health;
pub mod detect;
pub mod billing;
