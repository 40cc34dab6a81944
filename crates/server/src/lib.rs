//! Tamarind restaurant backend library.
//!
//! This crate provides the REST API as a library, allowing it to be tested
//! and reused (the CLI shares its config, pool, and migrations).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
