//! Copy and move documentation articles between projects.
//!
//! [`transfer::TransferClient`] wraps the article store's HTTP API;
//! [`tree::TreeCopier`] copies an article with its attachments and,
//! optionally, its whole subtree of descendants.

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod join;
pub mod state;
pub mod store;
pub mod transfer;
pub mod tree;
pub mod types;

pub use error::{Result, TransferError};
pub use transfer::TransferClient;
pub use tree::{CopyOutcome, CopyRequest, OrphanPolicy, TreeCopier, TreeCopyReport};
