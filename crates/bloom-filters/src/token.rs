//! Write-authorization tokens
//!
//! token = hex(md5(filter_name ‖ keyword ‖ salt))[6..12]
//!
//! This is a weak gate (24 bits, unkeyed MD5 with a public salt). It deters
//! casual misuse of the add path and is kept byte-compatible with existing
//! clients. Deployments without legacy clients can at least override the salt.

use md5::{Digest, Md5};
use subtle::ConstantTimeEq;

/// Salt used by existing clients
pub const LEGACY_SALT: &str = "tt.bloom";

/// Start offset of the token within the hex digest
const TOKEN_START: usize = 6;

/// End offset (exclusive) of the token within the hex digest
const TOKEN_END: usize = 12;

/// Derives and checks add-keyword tokens
#[derive(Clone, Debug)]
pub struct TokenValidator {
    salt: String,
}

impl Default for TokenValidator {
    fn default() -> Self {
        Self::new(LEGACY_SALT)
    }
}

impl TokenValidator {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Salt in use
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Compute the token a caller must present for `(filter_name, keyword)`
    ///
    /// Both inputs are raw bytes; keywords need not be UTF-8.
    pub fn expected_token(
        &self,
        filter_name: impl AsRef<[u8]>,
        keyword: impl AsRef<[u8]>,
    ) -> String {
        let mut hasher = Md5::new();
        hasher.update(filter_name.as_ref());
        hasher.update(keyword.as_ref());
        hasher.update(self.salt.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[TOKEN_START..TOKEN_END].to_string()
    }

    /// Check a supplied token against the expected one
    pub fn validate(
        &self,
        filter_name: impl AsRef<[u8]>,
        keyword: impl AsRef<[u8]>,
        supplied: impl AsRef<[u8]>,
    ) -> bool {
        let expected = self.expected_token(filter_name, keyword);
        constant_time_compare(expected.as_bytes(), supplied.as_ref())
    }
}

/// Constant-time byte comparison
///
/// Lengths are compared in constant time as well; the shorter input is padded
/// with a distinct byte so unequal lengths can never compare equal.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
