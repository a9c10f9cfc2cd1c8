//! PHQ-9 screening service: HTTP API and configuration

pub mod api;
pub mod config;
