//! Run configuration.
use anyhow::{anyhow, Result};

use crate::hash_index::{DEFAULT_BITS, MAX_BITS};

/// Parameters of one run of the [`Suite`](crate::Suite).
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::Config;
///
/// let config = Config::new("3 1 2").with_hash_bits(4).with_alloc_limit(Some(100));
/// config.validate()?;
///
/// assert_eq!(config.int_str(), "3 1 2");
/// assert_eq!(config.hash_bits(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    int_str: String,
    hash_bits: u32,
    alloc_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            int_str: String::new(),
            hash_bits: DEFAULT_BITS,
            alloc_limit: None,
        }
    }
}

impl Config {
    /// Creates a configuration for the space-separated integers `int_str`.
    pub fn new<S>(int_str: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            int_str: int_str.into(),
            ..Self::default()
        }
    }

    /// Sets the number of hash bucket bits.
    pub const fn with_hash_bits(mut self, bits: u32) -> Self {
        self.hash_bits = bits;
        self
    }

    /// Sets the number of live entries each structure may allocate.
    pub const fn with_alloc_limit(mut self, limit: Option<usize>) -> Self {
        self.alloc_limit = limit;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// An error is returned if the hash bucket bits are not in `1..=MAX_BITS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BITS).contains(&self.hash_bits) {
            return Err(anyhow!(
                "hash bits must be in 1..={MAX_BITS}, but got {}.",
                self.hash_bits
            ));
        }
        Ok(())
    }

    /// Returns the space-separated integers.
    pub fn int_str(&self) -> &str {
        &self.int_str
    }

    /// Returns the number of hash bucket bits.
    pub const fn hash_bits(&self) -> u32 {
        self.hash_bits
    }

    /// Returns the allocation limit per structure.
    pub const fn alloc_limit(&self) -> Option<usize> {
        self.alloc_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.int_str(), "");
        assert_eq!(config.hash_bits(), 10);
        assert_eq!(config.alloc_limit(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hash_bits_oob() {
        let e = Config::new("1").with_hash_bits(0).validate();
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("hash bits must be in 1..=20, but got 0.".to_string())
        );
    }
}
