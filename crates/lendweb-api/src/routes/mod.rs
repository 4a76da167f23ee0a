//! Route modules for the API server
//!
//! Each module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON / plain-text endpoints
//! - page.rs: HTMX page rendering

pub mod loans;
pub mod settings;
