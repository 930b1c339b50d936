//! civicfolio - content API for a political portfolio website
//!
//! Serves posts, categories, header navigation and contact form submissions
//! as JSON over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
