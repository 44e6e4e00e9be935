use crate::rep_checker::CheckOptions;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIRM_DELAY_SECS: &str = "confirm_delay_secs";
pub const MAX_CONCURRENCY: &str = "max_concurrency";
pub const DEADLINE_SECS: &str = "deadline_secs";

/// String key/value settings from the inventory, overridable from the command line.
#[derive(Debug, Default)]
pub struct SettingsProvider {
    settings: HashMap<String, String>,
}

impl SettingsProvider {
    pub fn new(settings: HashMap<String, String>) -> Self {
        Self { settings }
    }

    pub fn get_key(&self, key: &str) -> Option<String> {
        self.settings.get(key).cloned()
    }

    pub fn set_key(&mut self, key: &str, value: String) {
        self.settings.insert(key.to_string(), value);
    }

    fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.settings
            .get(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("Invalid value for setting {}: {:?}", key, value))
            })
            .transpose()
    }

    pub fn check_options(&self) -> Result<CheckOptions> {
        let mut options = CheckOptions::default();
        if let Some(secs) = self.get_parsed::<u64>(CONFIRM_DELAY_SECS)? {
            options.confirm_delay = Duration::from_secs(secs);
        }
        if let Some(max) = self.get_parsed::<usize>(MAX_CONCURRENCY)? {
            if max == 0 {
                anyhow::bail!("Setting {} must be at least 1", MAX_CONCURRENCY);
            }
            options.max_concurrency = max;
        }
        options.run_timeout = self.get_parsed::<u64>(DEADLINE_SECS)?.map(Duration::from_secs);
        Ok(options)
    }
}
