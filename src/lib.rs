//! Iron Lady participant tracking and coaching assistant client.

pub mod aggregate;
pub mod analytics;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod display;
pub mod form;
pub mod models;
pub mod view;
