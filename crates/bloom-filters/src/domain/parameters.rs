//! Bloom filter parameter math
//!
//! FPR = (1 - e^(-kn/m))^k

/// Calculate the false positive rate for given parameters
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fpr_empty_filter_is_zero() {
        assert_eq!(calculate_fpr(1000, 0, 5), 0.0);
    }

    #[test]
    fn test_fpr_zero_bits_is_one() {
        assert_eq!(calculate_fpr(0, 10, 5), 1.0);
    }
}
