use clap::ValueEnum;
use std::env;
use tallyup_domain::{MAX_SETTLEMENT_SCALE, RoundingMode, SettlementContext};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const CURRENCY_SCALE_VAR: &str = "TALLYUP_CURRENCY_SCALE";
pub const ROUNDING_MODE_VAR: &str = "TALLYUP_ROUNDING_MODE";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoundingArg {
    HalfUp,
    HalfEven,
}

impl From<RoundingArg> for RoundingMode {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::HalfUp => RoundingMode::HalfUp,
            RoundingArg::HalfEven => RoundingMode::HalfEven,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("TALLYUP_CURRENCY_SCALE must be a whole number, got '{0}'")]
    InvalidScale(String),
    #[error("currency scale {scale} is too large (max {max_supported})")]
    ScaleTooLarge { scale: u32, max_supported: u32 },
    #[error("TALLYUP_ROUNDING_MODE must be 'half-up' or 'half-even', got '{0}'")]
    InvalidRoundingMode(String),
}

/// Settlement settings from the environment, optionally overridden by CLI flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub settlement: SettlementContext,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let scale = env::var(CURRENCY_SCALE_VAR).ok();
        let rounding = env::var(ROUNDING_MODE_VAR).ok();
        Self::from_values(scale.as_deref(), rounding.as_deref())
    }

    fn from_values(scale: Option<&str>, rounding: Option<&str>) -> Result<Self, ConfigError> {
        let mut settlement = SettlementContext::usd_default();

        if let Some(raw) = scale.map(str::trim).filter(|raw| !raw.is_empty()) {
            let scale = raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidScale(raw.to_string()))?;
            settlement.scale = checked_scale(scale)?;
        }

        if let Some(raw) = rounding.map(str::trim).filter(|raw| !raw.is_empty()) {
            let arg = RoundingArg::from_str(raw, true)
                .map_err(|_| ConfigError::InvalidRoundingMode(raw.to_string()))?;
            settlement.rounding_mode = arg.into();
        }

        Ok(Self { settlement })
    }

    pub fn with_overrides(
        mut self,
        scale: Option<u32>,
        rounding: Option<RoundingArg>,
    ) -> Result<Self, ConfigError> {
        if let Some(scale) = scale {
            self.settlement.scale = checked_scale(scale)?;
        }
        if let Some(rounding) = rounding {
            self.settlement.rounding_mode = rounding.into();
        }
        Ok(self)
    }
}

fn checked_scale(scale: u32) -> Result<u32, ConfigError> {
    if scale > MAX_SETTLEMENT_SCALE {
        return Err(ConfigError::ScaleTooLarge {
            scale,
            max_supported: MAX_SETTLEMENT_SCALE,
        });
    }
    Ok(scale)
}

/// Logs go to stderr so command output stays clean; `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_to_cents_half_up() {
        let config = AppConfig::from_values(None, None).expect("config");
        assert_eq!(config.settlement, SettlementContext::usd_default());
    }

    #[rstest]
    #[case::yen(Some("0"), None, 0, RoundingMode::HalfUp)]
    #[case::bankers(None, Some("half-even"), 2, RoundingMode::HalfEven)]
    #[case::case_insensitive(Some(" 3 "), Some("HALF-UP"), 3, RoundingMode::HalfUp)]
    #[case::blank_is_default(Some(""), Some(""), 2, RoundingMode::HalfUp)]
    fn reads_values(
        #[case] scale: Option<&str>,
        #[case] rounding: Option<&str>,
        #[case] expected_scale: u32,
        #[case] expected_mode: RoundingMode,
    ) {
        let config = AppConfig::from_values(scale, rounding).expect("config");
        assert_eq!(config.settlement.scale, expected_scale);
        assert_eq!(config.settlement.rounding_mode, expected_mode);
    }

    #[rstest]
    #[case::not_a_number(Some("two"), None, ConfigError::InvalidScale("two".to_string()))]
    #[case::too_large(Some("40"), None, ConfigError::ScaleTooLarge { scale: 40, max_supported: 22 })]
    #[case::unknown_mode(None, Some("down"), ConfigError::InvalidRoundingMode("down".to_string()))]
    fn rejects_bad_values(
        #[case] scale: Option<&str>,
        #[case] rounding: Option<&str>,
        #[case] expected: ConfigError,
    ) {
        assert_eq!(AppConfig::from_values(scale, rounding), Err(expected));
    }

    #[test]
    fn flags_override_environment() {
        let config = AppConfig::from_values(Some("0"), None)
            .and_then(|config| config.with_overrides(Some(2), Some(RoundingArg::HalfEven)))
            .expect("config");

        assert_eq!(config.settlement.scale, 2);
        assert_eq!(config.settlement.rounding_mode, RoundingMode::HalfEven);
    }
}
