//! # Bloom Filters
//!
//! Named keyword filters loaded from dictionary files.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `BloomFilter`: Core probabilistic data structure
//!   - Hash functions and false-positive math
//!
//! - **Registry** (`registry`): name → filter map with per-filter locking
//!
//! - **Loader** (`loader`): parallel dictionary loading with an all-or-nothing
//!   barrier
//!
//! - **Token** (`token`): add-keyword authorization tokens
//!
//! ## Invariants
//!
//! - No false negatives: if inserted, `contains()` MUST return true
//! - The registry key set never changes after construction
//! - Loading yields a registry only when every source succeeded
//!
//! ## Usage Example
//!
//! ```ignore
//! use bloom_filters::{load_all, FilterConfig, TokenValidator};
//!
//! let registry = load_all(&["dicts/animals.txt".into()], &FilterConfig::default()).await?;
//! assert_eq!(registry.test("animals.txt", b"cat"), Some(true));
//!
//! let token = TokenValidator::default().expected_token("animals.txt", "fox");
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod registry;
pub mod token;

// Re-exports for convenience
pub use config::FilterConfig;
pub use domain::BloomFilter;
pub use error::FilterError;
pub use loader::{
    filter_name, load_all, load_all_with, load_source, read_keywords, LoadCancel, LoadOutcome,
};
pub use registry::FilterRegistry;
pub use token::{TokenValidator, LEGACY_SALT};
