use std::time::Duration;

use crate::application::DEFAULT_CONCURRENCY;
use crate::catalog::RepositorySelection;

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub selection: RepositorySelection,
    pub timeout: Duration,
    /// Feeds queried at the same time.
    pub jobs: usize,
    pub verbose: bool,
}

impl Config {
    pub fn new(selection: RepositorySelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection: RepositorySelection::All,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            jobs: DEFAULT_CONCURRENCY,
            verbose: false,
        }
    }
}
