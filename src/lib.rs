//! cabinet - Personal file cabinet
//!
//! A file/folder management backend: per-user folder trees, uploads,
//! downloads and zip packaging behind a REST API.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod record;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{CabinetError, Result};
pub use record::{
    FileRecord, FileService, FileStorage, FolderTreeNode, NewRecord, RecordKind, RecordRepository,
};
