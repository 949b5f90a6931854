/// Business logic layer for social-api
pub mod auth;
