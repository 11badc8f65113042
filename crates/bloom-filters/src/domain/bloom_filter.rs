//! Core Bloom filter implementation
//!
//! INVARIANTS:
//! - No false negatives: once inserted, `contains()` MUST return true
//! - `insert()` reports whether any of the element's bits was previously unset

use bitvec::prelude::*;

use super::hash_functions::compute_hash_positions;
use super::parameters::calculate_fpr;

/// Bloom filter for probabilistic keyword membership
///
/// False positives are possible, false negatives are not.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u64, Lsb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Size in bits (m)
    m: usize,
    /// Number of insert calls (n)
    n: usize,
}

impl BloomFilter {
    /// Create a new Bloom filter with specified parameters
    ///
    /// # Arguments
    /// * `m` - Size in bits
    /// * `k` - Number of hash functions
    pub fn new(m: usize, k: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; m],
            k,
            m,
            n: 0,
        }
    }

    /// Insert an element into the filter
    ///
    /// Returns `true` if at least one of the element's bit positions was
    /// unset before this call, i.e. the element was newly inserted. A `false`
    /// return means the filter already reported the element as present.
    pub fn insert(&mut self, element: &[u8]) -> bool {
        let mut newly_set = false;
        for pos in compute_hash_positions(element, self.k, self.m) {
            if !self.bits.replace(pos, true) {
                newly_set = true;
            }
        }
        self.n += 1;
        newly_set
    }

    /// Test if an element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set
    pub fn contains(&self, element: &[u8]) -> bool {
        compute_hash_positions(element, self.k, self.m)
            .iter()
            .all(|&pos| self.bits[pos])
    }

    /// Estimated false positive rate at the current fill level
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn false_positive_rate(&self) -> f64 {
        calculate_fpr(self.m, self.n, self.k)
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.m
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the number of insert calls made on this filter
    pub fn elements_inserted(&self) -> usize {
        self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_filter_new_creates_valid_filter() {
        let filter = BloomFilter::new(1000, 5);

        assert_eq!(filter.size_bits(), 1000);
        assert_eq!(filter.hash_count(), 5);
        assert_eq!(filter.elements_inserted(), 0);
        assert_eq!(filter.bits_set(), 0, "All bits should be zero initially");
    }

    #[test]
    fn test_insert_reports_newly_inserted() {
        let mut filter = BloomFilter::new(10_000, 5);

        assert!(filter.insert(b"cat"), "First insert must flip at least one bit");
        assert!(
            !filter.insert(b"cat"),
            "Second insert of the same keyword must not flip any bit"
        );
        assert_eq!(filter.elements_inserted(), 2);
    }

    #[test]
    fn test_insert_sets_at_most_k_bits() {
        let mut filter = BloomFilter::new(1000, 5);
        filter.insert(b"keyword");

        assert!(filter.bits_set() > 0);
        assert!(filter.bits_set() <= 5, "At most k=5 bits for one element");
    }

    #[test]
    fn test_no_false_negatives_bulk() {
        let mut filter = BloomFilter::new(100_000, 5);
        let keywords: Vec<String> = (0..2000).map(|i| format!("keyword_{i}")).collect();

        for kw in &keywords {
            filter.insert(kw.as_bytes());
        }

        for kw in &keywords {
            assert!(filter.contains(kw.as_bytes()), "False negative for {kw}");
        }
    }

    #[test]
    fn test_absent_keyword_in_sparse_filter() {
        let mut filter = BloomFilter::new(1 << 20, 5);
        filter.insert(b"cat");
        filter.insert(b"dog");

        assert!(!filter.contains(b"fox"));
        assert!(!filter.contains(b""));
    }

    #[test]
    fn test_empty_keyword_is_a_member_once_inserted() {
        let mut filter = BloomFilter::new(1 << 16, 5);
        assert!(filter.insert(b""));
        assert!(filter.contains(b""));
    }

    #[test]
    fn test_false_positive_rate_grows_with_fill() {
        let mut filter = BloomFilter::new(1000, 5);
        assert_eq!(filter.false_positive_rate(), 0.0);

        for i in 0..100 {
            filter.insert(format!("kw_{i}").as_bytes());
        }
        let fpr = filter.false_positive_rate();
        assert!(fpr > 0.0 && fpr < 1.0, "unexpected fpr {fpr}");
    }
}
