//! Domain types for Masquerade.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Error types** ([`MasqueradeError`], [`InputError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, MasqueradeError>`]:
//!
//! ```rust
//! use masquerade::domain::{InputError, MasqueradeError, Result};
//!
//! fn check(text: &str) -> Result<()> {
//!     if text.is_empty() {
//!         return Err(InputError::EmptyText.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check(""), Err(MasqueradeError::InvalidInput(_))));
//! ```

pub mod errors;
pub mod result;

pub use errors::{InputError, MasqueradeError};
pub use result::Result;
