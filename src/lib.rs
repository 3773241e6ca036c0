//! Grocery Ledger Library
//!
//! Grocery purchase logging with unit-aware nutrition and spending analytics.

pub mod analytics;
pub mod build_info;
pub mod config;
pub mod db;
pub mod ledger;
pub mod lookup;
pub mod models;
pub mod nutrition;
pub mod tools;
