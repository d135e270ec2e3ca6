// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Choice of low-complexity method and validation of its threshold.

use std::fmt;

use crate::error::LcError;

/// Smallest and largest threshold accepted for either method.
pub const MIN_THRESHOLD: f64 = 0.0;
pub const MAX_THRESHOLD: f64 = 100.0;

/// Low-complexity scoring method.
///
/// # Serde
/// The variants are renamed into lower case by serde:
/// ```rust
/// use lc_filter::threshold::LcMethod;
/// assert_eq!(serde_json::from_str::<LcMethod>(r#""dust""#).unwrap(), LcMethod::Dust);
/// assert_eq!(serde_json::from_str::<LcMethod>(r#""entropy""#).unwrap(), LcMethod::Entropy);
/// ```
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LcMethod {
    /// Triplet-repetitiveness score. Reads scoring above the threshold are
    /// discarded.
    Dust,
    /// Shannon entropy of triplets. Reads scoring below the threshold are
    /// discarded.
    Entropy,
}

impl fmt::Display for LcMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LcMethod::Dust => write!(f, "dust"),
            LcMethod::Entropy => write!(f, "entropy"),
        }
    }
}

/// A method together with a validated threshold in `[0, 100]`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct LcThreshold {
    pub method: LcMethod,
    pub value: f64,
}

impl LcThreshold {
    /// Pick the threshold for `method` out of the supplied ones and check
    /// its range. The threshold for the other method is ignored.
    pub fn validate(
        method: LcMethod,
        dust_threshold: Option<f64>,
        entropy_threshold: Option<f64>,
    ) -> Result<LcThreshold, LcError> {
        let value = match method {
            LcMethod::Dust => dust_threshold,
            LcMethod::Entropy => entropy_threshold,
        };

        let value = value.ok_or_else(|| {
            LcError::invalid(format!(
                "A low complexity threshold needs to be entered for {}",
                method
            ))
        })?;

        // written so that NaN is rejected
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value) {
            return Err(LcError::invalid(format!(
                "The threshold for {} must be between {} and {}, it is currently set to : {}",
                method, MIN_THRESHOLD, MAX_THRESHOLD, value
            )));
        }

        Ok(LcThreshold { method, value })
    }

    /// True if a read with complexity `score` is retained.
    #[inline]
    pub fn keeps(&self, score: f64) -> bool {
        match self.method {
            LcMethod::Dust => score <= self.value,
            LcMethod::Entropy => score >= self.value,
        }
    }
}
