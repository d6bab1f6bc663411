//! # GradBot Gateway
//! Read-mostly JSON API over the live bot state, plus a command endpoint.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
