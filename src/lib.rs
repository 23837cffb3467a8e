//! Mental math quiz server library.
//!
//! Accounts (local and GitHub), cookie sessions, arithmetic questions and
//! leaderboards behind an actix-web HTTP API.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
