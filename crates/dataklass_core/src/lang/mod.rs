//! Vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. `MagicMethodId`, `KeywordId`) and look up spellings and
//! metadata via registry tables instead of matching on strings.
//!
//! ## Examples
//! ```rust
//! use dataklass_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("yield"), Some(KeywordId::Yield));
//! assert_eq!(keywords::as_str(KeywordId::Yield), "yield");
//! ```

pub mod builtins;
pub mod families;
pub mod keywords;
pub mod magic_methods;
pub mod registry;
