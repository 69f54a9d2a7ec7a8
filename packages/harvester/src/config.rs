//! Configuration constants and validation functions for the harvester.

use std::time::Duration;

use crate::error::{HarvesterError, Result};

/// Base URL of the e-Gov law API.
pub const EGOV_BASE_URL: &str = "https://elaws.e-gov.go.jp";

/// Base URL of the Financial Services Agency site (also hosts SESC).
pub const FSA_BASE_URL: &str = "https://www.fsa.go.jp";

/// Base URL of the Japan Exchange Group site.
pub const JPX_BASE_URL: &str = "https://www.jpx.co.jp";

/// Entry page of the JPX rule book.
pub const JPX_RULES_URL: &str = "https://jpx-gr.info";

/// Base URL of the Japan Securities Dealers Association site.
pub const JSDA_BASE_URL: &str = "https://www.jsda.or.jp";

/// Page listing the JSDA association rules.
pub const JSDA_KISOKU_URL: &str = "https://www.jsda.or.jp/about/kisoku";

/// Base URL of the Daiwa Institute of Research site.
pub const DIR_BASE_URL: &str = "https://www.dir.co.jp";

/// Default number of concurrent downloads.
pub const DEFAULT_JOBS: usize = 4;

/// Environment variable holding an optional HTTP timeout in seconds.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "LEGALDATA_HTTP_TIMEOUT_SECS";

/// Environment variable holding the number of concurrent downloads.
pub const ENV_JOBS: &str = "LEGALDATA_JOBS";

/// Transport settings shared by every loader and persistence call.
///
/// There is no timeout unless one is configured explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Option<Duration>,
    pub jobs: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            jobs: DEFAULT_JOBS,
        }
    }
}

impl FetchConfig {
    /// Read settings from `LEGALDATA_*` environment variables.
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let timeout = std::env::var(ENV_HTTP_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        let jobs = std::env::var(ENV_JOBS)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_JOBS);

        Self { timeout, jobs }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

/// Validate that a year lies in an inclusive range.
///
/// # Examples
/// ```
/// use legaldata_harvester::config::validate_year_range;
///
/// assert!(validate_year_range(2024, 2000, 2100).is_ok());
/// assert!(validate_year_range(1999, 2000, 2100).is_err());
/// ```
pub fn validate_year_range(year: i32, min: i32, max: i32) -> Result<i32> {
    if year < min {
        return Err(HarvesterError::invalid_config(
            "year",
            year,
            format!("greater than or equal to {min}"),
        ));
    }
    if year > max {
        return Err(HarvesterError::invalid_config(
            "year",
            year,
            format!("less than or equal to {max}"),
        ));
    }
    Ok(year)
}

/// Validate that a year is one of the years a site publishes.
///
/// # Examples
/// ```
/// use legaldata_harvester::config::validate_year_in;
///
/// assert!(validate_year_in(2023, &[2024, 2023]).is_ok());
/// assert!(validate_year_in(2019, &[2024, 2023]).is_err());
/// ```
pub fn validate_year_in(year: i32, available: &[i32]) -> Result<i32> {
    if available.contains(&year) {
        Ok(year)
    } else {
        Err(HarvesterError::invalid_config(
            "year",
            year,
            format!("one of {available:?}"),
        ))
    }
}
