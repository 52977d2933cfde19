//! HTTP inbound adapter exposing the JSON API and the back-office pages.

pub mod admin;
pub mod admin_pages;
pub mod auth;
pub mod cache_control;
pub mod content;
pub mod error;
pub mod health;
pub mod html;
pub mod leads;
pub mod referrals;
pub mod routes;
pub mod session;
pub mod session_config;
pub mod state;
pub mod subscribers;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
