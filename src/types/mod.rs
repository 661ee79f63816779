//! Shared types

pub mod error;

pub use error::{GenealogyError, Result};
