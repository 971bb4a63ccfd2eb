//! Secret handling utilities.
//!
//! Re-exports secrecy types for working with secrets in the siteaudit
//! context.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
