//! HTTP request handlers

pub mod health;
pub mod repository;
pub mod review;
pub mod types;

pub use health::*;
pub use repository::*;
pub use review::*;
