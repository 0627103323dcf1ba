//! Coach Apply: lead-qualification wizard and submission service.

pub mod apply;
pub mod config;
pub mod error;
pub mod store;
