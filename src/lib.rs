//! Rustdex library
//!
//! This module exposes the application's modules for use in integration tests.

pub mod api;
pub mod app;
pub mod battle;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod draw;
pub mod save;
