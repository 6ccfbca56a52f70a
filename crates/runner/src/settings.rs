//! Layered settings: defaults < TOML file < BLOOMLOAD_* env < CLI flags

use anyhow::{bail, Context, Result};
use bloomload_core::application::worker::constants::{
    DEFAULT_GRACEFUL_STOP, DEFAULT_TEST_DURATION, DEFAULT_VUS,
};
use bloomload_core::application::LoadProfile;
use bloomload_core::domain::scenario::{
    DIRECT_TARGET, GATEWAY_TARGET, INVENTORY_TARGET, ITERATION_PAUSE,
};
use bloomload_core::domain::{NameStrategy, Scenario, ScenarioKind};
use bloomload_infra_http::HttpClientConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "BLOOMLOAD";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scenario: String,
    pub vus: u64,
    pub duration: String,
    pub graceful_stop: String,
    pub pause: String,
    pub shop_id: Option<String>,
    /// Fixed item name (single scenario)
    pub item_name: Option<String>,
    /// Prefix of the per-iteration name (dual scenario)
    pub name_prefix: Option<String>,
    pub single_url: Option<String>,
    pub gateway_url: Option<String>,
    pub direct_url: Option<String>,
    /// Overrides every target's timeout
    pub request_timeout: Option<String>,
    pub connect_timeout: Option<String>,
    pub user_agent: Option<String>,
    pub pool_max_idle_per_host: Option<usize>,
    /// Fraction of checks that must pass, 0.0 - 1.0
    pub min_pass_rate: Option<f64>,
}

/// Values given on the command line; `None` leaves lower layers alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scenario: Option<String>,
    pub vus: Option<u64>,
    pub duration: Option<String>,
    pub min_pass_rate: Option<f64>,
}

impl Settings {
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("scenario", ScenarioKind::Single.as_str())?
            .set_default("vus", DEFAULT_VUS)?
            .set_default("duration", format_duration(DEFAULT_TEST_DURATION))?
            .set_default("graceful_stop", format_duration(DEFAULT_GRACEFUL_STOP))?
            .set_default("pause", format_duration(ITERATION_PAUSE))?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("scenario", overrides.scenario.clone())?
            .set_override_option("vus", overrides.vus)?
            .set_override_option("duration", overrides.duration.clone())?
            .set_override_option("min_pass_rate", overrides.min_pass_rate)?
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if let Some(rate) = settings.min_pass_rate {
            if !(0.0..=1.0).contains(&rate) {
                bail!("min_pass_rate must be between 0.0 and 1.0, got {}", rate);
            }
        }

        Ok(settings)
    }

    pub fn scenario_kind(&self) -> Result<ScenarioKind> {
        Ok(self.scenario.parse::<ScenarioKind>()?)
    }

    /// Scenario with every configured override applied and validated
    pub fn scenario(&self) -> Result<Scenario> {
        let mut scenario = Scenario::for_kind(self.scenario_kind()?);
        scenario.pause = parse_duration(&self.pause).context("pause")?;

        if let Some(shop_id) = &self.shop_id {
            scenario.template = scenario.template.with_shop_id(shop_id.as_str())?;
        }
        match &mut scenario.template.name {
            NameStrategy::Fixed(name) => {
                if let Some(item_name) = &self.item_name {
                    *name = item_name.clone();
                }
            }
            NameStrategy::PerIteration { prefix } => {
                if let Some(name_prefix) = &self.name_prefix {
                    *prefix = name_prefix.clone();
                }
            }
        }

        let request_timeout = self
            .request_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("request_timeout")?;

        for target in &mut scenario.targets {
            let url = match target.name.as_str() {
                INVENTORY_TARGET => &self.single_url,
                GATEWAY_TARGET => &self.gateway_url,
                DIRECT_TARGET => &self.direct_url,
                _ => &None,
            };
            if let Some(url) = url {
                target.url = url.clone();
            }
            if let Some(timeout) = request_timeout {
                target.timeout = Some(timeout);
            }
        }

        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load_profile(&self) -> Result<LoadProfile> {
        let profile = LoadProfile {
            vus: self.vus,
            duration: parse_duration(&self.duration).context("duration")?,
            graceful_stop: parse_duration(&self.graceful_stop).context("graceful_stop")?,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn http_config(&self) -> Result<HttpClientConfig> {
        let mut config = HttpClientConfig::default();
        if let Some(connect_timeout) = &self.connect_timeout {
            config.connect_timeout =
                Some(parse_duration(connect_timeout).context("connect_timeout")?);
        }
        if let Some(user_agent) = &self.user_agent {
            if user_agent.trim().is_empty() {
                bail!("user_agent cannot be empty");
            }
            config.user_agent = user_agent.clone();
        }
        if let Some(pool_max_idle_per_host) = self.pool_max_idle_per_host {
            config.pool_max_idle_per_host = pool_max_idle_per_host;
        }
        Ok(config)
    }
}

/// Parse "500ms", "30s", "10m", "1h" (a bare number means seconds)
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("duration string cannot be empty");
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (value, unit) = s.split_at(split);
    let value: u64 = value
        .parse()
        .with_context(|| format!("invalid numeric value in duration '{}'", s))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => bail!(
            "unknown duration unit '{}' in '{}', use ms, s, m or h",
            other,
            s
        ),
    };
    let secs = value
        .checked_mul(secs_per_unit)
        .with_context(|| format!("duration '{}' is too large", s))?;
    Ok(Duration::from_secs(secs))
}

fn format_duration(d: Duration) -> String {
    if d.subsec_millis() != 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}s", d.as_secs())
    }
}
