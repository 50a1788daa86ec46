//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OpenID-Connect login with a state nonce
//! - Sealed session cookies
//! - Session extractors for pages and upload endpoints

pub mod extractors;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;


pub use extractors::{AuthedUser, PageUser};
pub use models::User;
pub use routes::auth_routes;
