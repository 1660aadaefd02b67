use std::{env, time::Duration};

use crate::{errors::Error, Result};

/// Typed runtime configuration, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Budget for each blocking wait (control signal or jump reply).
    pub wait_timeout: Duration,
    /// Items rendered onto one page.
    pub items_per_page: usize,
    /// At or below this many total items the view is a static single page
    /// and no controls are attached.
    pub single_page_threshold: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let wait_timeout = Duration::from_secs(env_u64("PAGEFLOW_WAIT_TIMEOUT_SECS").unwrap_or(60));
        let items_per_page = env_usize("PAGEFLOW_ITEMS_PER_PAGE").unwrap_or(10);
        let single_page_threshold =
            env_usize("PAGEFLOW_SINGLE_PAGE_THRESHOLD").unwrap_or(items_per_page);

        if items_per_page == 0 {
            return Err(Error::Config(
                "PAGEFLOW_ITEMS_PER_PAGE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            wait_timeout,
            items_per_page,
            single_page_threshold,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(60),
            items_per_page: 10,
            single_page_threshold: 10,
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}
