//! Pipeline configuration loaded from JSON.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::style::Theme;

/// Environment variable selecting the theme.
pub const THEME_ENV: &str = "STREAMDASH_THEME";

/// Settings of the two-chart streaming dashboard.
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Span kept visible on the scrolling Y axes.
    pub view_range: f64,
    /// X distance between generated samples.
    pub step: f64,
    /// Sampling domain end of the regressive (sine) generator.
    pub regressive_end: f64,
    /// Sampling domain end of the progressive (composite wave) generator.
    pub progressive_end: f64,
    /// Points per streamed batch.
    pub batch_size: usize,
    /// Milliseconds between batches.
    pub interval_ms: u64,
    /// Restart generators after their last batch.
    pub repeat: bool,
    /// Points always kept by data cleaning.
    pub min_data_point_count: usize,
    /// Optional hard cap on retained points per series.
    pub max_sample_count: Option<usize>,
    /// Theme name.
    pub theme: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            view_range: PI * 2.0 * 10.0,
            step: 0.015,
            regressive_end: PI * 2.0,
            progressive_end: PI * 100.0,
            batch_size: 20,
            interval_ms: 20,
            repeat: true,
            min_data_point_count: 10_000,
            max_sample_count: None,
            theme: None,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check value domains.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.view_range.is_finite() || self.view_range <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "view_range must be positive, got {}",
                self.view_range
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        for (name, end) in [
            ("regressive_end", self.regressive_end),
            ("progressive_end", self.progressive_end),
        ] {
            if !end.is_finite() || end < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and not negative, got {end}"
                )));
            }
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.max_sample_count == Some(0) {
            return Err(ConfigError::Invalid(
                "max_sample_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Pick the theme name: command line first, then environment, then file.
    pub fn theme_name<'a>(
        &'a self,
        cli: Option<&'a str>,
        env: Option<&'a str>,
    ) -> Option<&'a str> {
        cli.or(env).or(self.theme.as_deref())
    }

    /// Resolve the theme from the same sources as [`Self::theme_name`].
    pub fn resolve_theme(&self, cli: Option<&str>, env: Option<&str>) -> Theme {
        Theme::resolve(self.theme_name(cli, env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = PipelineConfig::from_json_str(r#"{ "batch_size": 5 }"#).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.step, 0.015);
        assert_eq!(config.min_data_point_count, 10_000);
        assert!(config.repeat);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = PipelineConfig::from_json_str(r#"{ "step": -1.0 }"#).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
        let error = PipelineConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(error, ConfigError::Json(_)));
    }

    #[test]
    fn theme_sources_in_priority_order() {
        let config = PipelineConfig {
            theme: Some("lightNew".into()),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.theme_name(Some("cyberSpace"), Some("darkGold")),
            Some("cyberSpace")
        );
        assert_eq!(config.theme_name(None, Some("darkGold")), Some("darkGold"));
        assert_eq!(config.resolve_theme(None, None).name, "lightNew");
        assert_eq!(
            PipelineConfig::default().resolve_theme(None, None).name,
            "darkGold"
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let error = PipelineConfig::load("/nonexistent/streamdash.json").unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }
}
