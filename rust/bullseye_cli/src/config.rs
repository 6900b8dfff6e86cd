use bullseye::PipelineConfig;
use kronik::TrackerConfig;
use std::path::Path;
use tracing::info;

use crate::cli::{
    MatchingArgs,
    TrackingArgs,
};
use crate::error::CliError;

/// Reads the json configuration, missing sections fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let config = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

impl TrackingArgs {
    pub fn apply(&self, config: &mut TrackerConfig) {
        if let Some(gap) = self.gap_tolerance {
            config.gap_tolerance = gap;
        }
        if let Some(ppm) = self.persist_tolerance {
            config.ppm_tolerance = ppm;
        }
        if let Some(scans) = self.scan_tolerance {
            config.match_run_length = scans;
        }
    }
}

impl MatchingArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(max_persist) = self.max_persist {
            config.filters.max_persist = max_persist;
        }
        if self.exact_match {
            config.matcher.exact_match_only = true;
        }
        if let Some(max_mass) = self.max_mass {
            config.filters.max_mass = max_mass;
        }
        if let Some(min_mass) = self.min_mass {
            config.filters.min_mass = min_mass;
        }
        if let Some(ppm) = self.exact_tolerance {
            config.matcher.ppm_tolerance = ppm;
        }
        if let Some(rt) = self.retention_tolerance {
            config.matcher.rt_tolerance = rt;
        }
        if let Some(batch_size) = self.batch_size {
            config.output.batch_size = batch_size;
        }
    }
}

pub fn validate_tracker(config: &TrackerConfig) -> Result<(), CliError> {
    if !(config.ppm_tolerance > 0.0) {
        return Err(CliError::Config(format!(
            "persist tolerance must be positive, got {}",
            config.ppm_tolerance
        )));
    }
    if config.match_run_length == 0 {
        return Err(CliError::Config(
            "scan tolerance must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn validate(config: &PipelineConfig) -> Result<(), CliError> {
    validate_tracker(&config.tracker)?;
    if !(config.matcher.ppm_tolerance > 0.0) {
        return Err(CliError::Config(format!(
            "exact tolerance must be positive, got {}",
            config.matcher.ppm_tolerance
        )));
    }
    if config.matcher.rt_tolerance < 0.0 {
        return Err(CliError::Config(format!(
            "retention tolerance can not be negative, got {}",
            config.matcher.rt_tolerance
        )));
    }
    if config.filters.min_mass > config.filters.max_mass {
        return Err(CliError::Config(format!(
            "min mass {} is above max mass {}",
            config.filters.min_mass, config.filters.max_mass
        )));
    }
    if config.output.batch_size == 0 {
        return Err(CliError::Config(
            "batch size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
