//! Core types for controller variable access.
//!
//! This crate has no I/O. It provides:
//! - **Category**: the fixed set of variable kinds and their properties
//! - **PrefixTable**: name-prefix to category resolution
//! - **EndpointTable**: REST paths per category
//! - **Value**: locally typed values and their wire encoding
//! - **validate**: casting of caller-supplied values before a write

pub mod category;
pub mod endpoint;
pub mod error;
pub mod prefix;
pub mod validate;
pub mod value;

pub use category::{BaseType, Category};
pub use endpoint::{EndpointTable, DEFAULT_BASE_PATH};
pub use error::{ErrorKind, PacError, Result};
pub use prefix::{split_prefix, PrefixTable, DEFAULT_PREFIXES};
pub use validate::{conform, validate, validate_element};
pub use value::Value;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
