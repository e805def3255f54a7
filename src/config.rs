use anyhow::{bail, Context, Result};
#[cfg(test)]
use std::collections::HashMap;
use std::env;
use std::time::Duration;

use chrono_tz::Tz;

use crate::retry::RetryBudget;

#[derive(Debug, Clone)]
pub struct Config {
    // WebDriver endpoint (chromedriver)
    pub webdriver_url: String,

    // Booking site
    pub login_url: String,
    /// Club identifier cookie; the same booking software serves many clubs.
    pub club_id: String,

    // Release schedule
    pub time_zone: Tz,
    pub release_hour: u32,
    pub release_minute: u32,
    /// How many days ahead the calendar opens bookings.
    pub lead_days: u32,

    // Candidate generation
    pub slot_step_minutes: u32,

    // Retry budgets
    pub web_timeout_secs: u64,
    pub max_page_retries: u32,
    pub max_slot_retries: u32,
    pub confirm_retries: u32,
    pub poll_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            webdriver_url: get("TEE_WEBDRIVER_URL")
                .unwrap_or_else(|| "http://localhost:9515".to_string()),

            login_url: get("TEE_LOGIN_URL")
                .unwrap_or_else(|| "https://e-s-p.com/elitelive/login.php".to_string()),
            club_id: get("TEE_CLUB_ID").unwrap_or_else(|| "1574".to_string()),

            time_zone: get("TEE_TIME_ZONE")
                .unwrap_or_else(|| "Europe/London".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("TEE_TIME_ZONE is not a valid zone: {}", e))?,
            release_hour: get("TEE_RELEASE_HOUR")
                .unwrap_or_else(|| "13".to_string())
                .parse()
                .context("TEE_RELEASE_HOUR must be a number")?,
            release_minute: get("TEE_RELEASE_MINUTE")
                .unwrap_or_else(|| "0".to_string())
                .parse()
                .context("TEE_RELEASE_MINUTE must be a number")?,
            lead_days: get("TEE_LEAD_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(crate::dates::DEFAULT_LEAD_DAYS),

            slot_step_minutes: get("TEE_SLOT_STEP_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(crate::times::DEFAULT_STEP_MINUTES),

            web_timeout_secs: get("TEE_WEB_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            max_page_retries: get("TEE_MAX_PAGE_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            max_slot_retries: get("TEE_MAX_SLOT_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            confirm_retries: get("TEE_CONFIRM_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            poll_interval_ms: get("TEE_POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
        })
    }

    /// Create config from a HashMap (convenience for testing)
    #[cfg(test)]
    pub fn from_map(map: &HashMap<&str, &str>) -> Result<Self> {
        Self::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    /// Validate configuration values at startup.
    /// Returns Ok(()) if all validations pass, or Err with details of what failed.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.release_hour >= 24 {
            errors.push(format!("TEE_RELEASE_HOUR={} is not a valid hour.", self.release_hour));
        }
        if self.release_minute >= 60 {
            errors.push(format!(
                "TEE_RELEASE_MINUTE={} is not a valid minute.",
                self.release_minute
            ));
        }

        if self.lead_days == 0 || self.lead_days > 60 {
            errors.push(format!(
                "TEE_LEAD_DAYS={} out of range (expected 1-60).",
                self.lead_days
            ));
        }

        if self.slot_step_minutes == 0 {
            errors.push("TEE_SLOT_STEP_MINUTES must be greater than 0.".to_string());
        }

        if self.web_timeout_secs == 0 {
            errors.push("TEE_WEB_TIMEOUT_SECS must be greater than 0.".to_string());
        }
        if self.max_page_retries == 0 {
            errors.push("TEE_MAX_PAGE_RETRIES must be greater than 0.".to_string());
        }
        if self.max_slot_retries == 0 {
            errors.push("TEE_MAX_SLOT_RETRIES must be greater than 0.".to_string());
        }
        if self.confirm_retries == 0 {
            errors.push("TEE_CONFIRM_RETRIES must be greater than 0.".to_string());
        }
        if self.poll_interval_ms == 0 {
            errors.push("TEE_POLL_INTERVAL_MS must be greater than 0.".to_string());
        }

        if !self.webdriver_url.starts_with("http://") && !self.webdriver_url.starts_with("https://")
        {
            errors.push(format!(
                "TEE_WEBDRIVER_URL '{}' is not an http(s) endpoint.",
                self.webdriver_url
            ));
        }
        if self.club_id.trim().is_empty() {
            errors.push("TEE_CLUB_ID cannot be empty.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }

    /// Budget for the day-selection refresh loop.
    pub fn page_budget(&self) -> RetryBudget {
        RetryBudget::new(
            self.max_page_retries,
            Duration::from_secs(self.web_timeout_secs),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    /// Budget for the slot acquisition scan loop.
    pub fn slot_budget(&self) -> RetryBudget {
        RetryBudget::new(
            self.max_slot_retries,
            Duration::from_secs(self.web_timeout_secs),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    /// Smaller budget for the confirmation sub-loop: the submit control
    /// either renders within a few seconds or the booking is lost anyway.
    pub fn confirm_budget(&self) -> RetryBudget {
        RetryBudget::new(
            self.confirm_retries,
            Duration::from_secs(self.web_timeout_secs.min(5)),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}
