pub mod account;
pub mod admin;
pub mod components;
pub mod homepage;
pub mod layout;
pub mod posts;
pub mod submission;

// Re-export commonly used functions from layout
pub use layout::{error_page, page, render, titled};
