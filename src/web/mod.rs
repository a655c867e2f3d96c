//! Web Front-end
//!
//! A single upload form that runs the guitar removal pipeline synchronously
//! per request and links the original and processed files.

pub mod page;
pub mod server;
pub mod upload;

pub use page::PageView;
pub use server::{router, serve, prepare_dirs};
