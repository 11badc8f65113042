//! Domain Layer - Pure filter logic
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bloom_filter;
pub mod hash_functions;
pub mod parameters;

pub use bloom_filter::BloomFilter;
pub use parameters::calculate_fpr;
