//! Setly flow: guided onboarding flows with best-effort advisory text.

pub mod advisory;
pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod flow;
pub mod gesture;
pub mod session;
