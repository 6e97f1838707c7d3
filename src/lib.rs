//! Admin client for the PenToPublic book platform: loads the moderation
//! dashboard from the REST API, tolerates partial failure, and applies
//! approve/reject decisions locally once the server accepts them.

pub mod aggregator;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod display;
pub mod logging;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;
pub mod tabs;
pub mod view;
