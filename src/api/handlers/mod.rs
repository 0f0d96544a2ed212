//! HTTP request handlers.

pub mod delete;
pub mod health;
pub mod redirect;
pub mod shorten;
pub mod stats;

pub use delete::delete_link_handler;
pub use health::{health_handler, live_handler, ready_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::stats_handler;
