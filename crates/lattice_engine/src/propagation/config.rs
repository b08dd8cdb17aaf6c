//! Propagation engine configuration.
//!
//! Built either through [`EngineConfig::builder`] or from TOML text, with
//! optional environment variable overrides:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LATTICE_MAX_HEIGHT` | `max_height` |
//! | `LATTICE_TRAVERSAL` | `traversal` (`sequential` or `level_parallel`) |

use lattice_core::types::ConfigError;
use serde::Deserialize;

use crate::lattice::{HeightGuard, DEFAULT_MAX_HEIGHT, DEFAULT_WARN_HEIGHT, HARD_MAX_HEIGHT};

/// Environment variable overriding `max_height`.
pub const ENV_MAX_HEIGHT: &str = "LATTICE_MAX_HEIGHT";

/// Environment variable overriding `traversal`.
pub const ENV_TRAVERSAL: &str = "LATTICE_TRAVERSAL";

/// Default level width from which a level is evaluated in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// How propagation passes walk the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Single-threaded explicit-stack walk.
    #[default]
    Sequential,
    /// Level by level, with wide levels evaluated on the rayon pool.
    LevelParallel,
}

impl TraversalMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Some(Self::Sequential),
            "level_parallel" | "parallel" => Some(Self::LevelParallel),
            _ => None,
        }
    }
}

/// Immutable engine configuration.
///
/// # Examples
///
/// ```
/// use lattice_engine::propagation::{EngineConfig, TraversalMode};
///
/// let config = EngineConfig::builder()
///     .max_height(16)
///     .traversal(TraversalMode::LevelParallel)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_height(), 16);
/// assert_eq!(config.height_guard().max, 16);
///
/// let from_toml = EngineConfig::from_toml_str("max_height = 12").unwrap();
/// assert_eq!(from_toml.traversal(), TraversalMode::Sequential);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    max_height: u32,
    warn_height: u32,
    traversal: TraversalMode,
    parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
            warn_height: DEFAULT_WARN_HEIGHT,
            traversal: TraversalMode::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Creates a builder starting from the defaults.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parses and validates TOML text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` for malformed text or unknown fields, otherwise
    /// any error from [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LATTICE_MAX_HEIGHT` and `LATTICE_TRAVERSAL` from the
    /// process environment, then validates.
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable source, then validates.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_HEIGHT) {
            self.max_height = raw.trim().parse().map_err(|_| ConfigError::InvalidParameter {
                name: "max_height",
                value: format!("'{}' is not a non-negative integer", raw),
            })?;
        }

        if let Some(raw) = lookup(ENV_TRAVERSAL) {
            self.traversal =
                TraversalMode::parse(&raw).ok_or_else(|| ConfigError::InvalidParameter {
                    name: "traversal",
                    value: format!("'{}' is not sequential or level_parallel", raw),
                })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Maximum height accepted by guarded generation.
    #[inline]
    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Height above which generation logs a warning, never above
    /// `max_height`.
    #[inline]
    pub fn warn_height(&self) -> u32 {
        self.warn_height.min(self.max_height)
    }

    /// Traversal mode for propagation passes.
    #[inline]
    pub fn traversal(&self) -> TraversalMode {
        self.traversal
    }

    /// Minimum level width evaluated in parallel.
    #[inline]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Whether a level of `width` nodes is evaluated on the rayon pool.
    #[inline]
    pub fn should_parallelize(&self, width: usize) -> bool {
        self.traversal == TraversalMode::LevelParallel && width >= self.parallel_threshold
    }

    /// Guard for [`PerfectLattice::generate_guarded`](crate::lattice::PerfectLattice::generate_guarded).
    pub fn height_guard(&self) -> HeightGuard {
        HeightGuard {
            max: self.max_height,
            warn: self.warn_height(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `max_height` is greater than 30
    /// - `parallel_threshold` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_height > HARD_MAX_HEIGHT {
            return Err(ConfigError::InvalidMaxHeight(self.max_height));
        }
        if self.parallel_threshold == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "parallel_threshold",
                value: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    max_height: Option<u32>,
    warn_height: Option<u32>,
    traversal: TraversalMode,
    parallel_threshold: Option<usize>,
}

impl EngineConfigBuilder {
    /// Sets the maximum generation height, in [0, 30].
    #[inline]
    pub fn max_height(mut self, max_height: u32) -> Self {
        self.max_height = Some(max_height);
        self
    }

    /// Sets the warning height (clamped to `max_height` on read).
    #[inline]
    pub fn warn_height(mut self, warn_height: u32) -> Self {
        self.warn_height = Some(warn_height);
        self
    }

    /// Sets the traversal mode.
    #[inline]
    pub fn traversal(mut self, traversal: TraversalMode) -> Self {
        self.traversal = traversal;
        self
    }

    /// Sets the minimum level width evaluated in parallel.
    #[inline]
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig {
            max_height: self.max_height.unwrap_or(DEFAULT_MAX_HEIGHT),
            warn_height: self.warn_height.unwrap_or(DEFAULT_WARN_HEIGHT),
            traversal: self.traversal,
            parallel_threshold: self.parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_validates() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_height(), 24);
        assert_eq!(config.warn_height(), 20);
        assert_eq!(config.parallel_threshold(), 1024);
        assert_eq!(config.traversal(), TraversalMode::Sequential);
    }

    #[test]
    fn test_warn_height_clamped_to_max() {
        let config = EngineConfig::builder().max_height(10).build().unwrap();
        assert_eq!(config.warn_height(), 10);

        let config = EngineConfig::builder()
            .max_height(10)
            .warn_height(12)
            .build()
            .unwrap();
        assert_eq!(config.height_guard().warn, 10);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert_eq!(
            EngineConfig::builder().max_height(31).build(),
            Err(ConfigError::InvalidMaxHeight(31))
        );
        assert!(matches!(
            EngineConfig::builder().parallel_threshold(0).build(),
            Err(ConfigError::InvalidParameter {
                name: "parallel_threshold",
                ..
            })
        ));
    }

    #[test]
    fn test_should_parallelize() {
        let sequential = EngineConfig::builder().parallel_threshold(4).build().unwrap();
        assert!(!sequential.should_parallelize(100));

        let parallel = EngineConfig::builder()
            .traversal(TraversalMode::LevelParallel)
            .parallel_threshold(4)
            .build()
            .unwrap();
        assert!(!parallel.should_parallelize(3));
        assert!(parallel.should_parallelize(4));
    }

    #[test]
    fn test_from_toml_str() {
        let config = EngineConfig::from_toml_str(
            r#"
            max_height = 18
            warn_height = 16
            traversal = "level_parallel"
            parallel_threshold = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.max_height(), 18);
        assert_eq!(config.warn_height(), 16);
        assert_eq!(config.traversal(), TraversalMode::LevelParallel);
        assert_eq!(config.parallel_threshold(), 64);

        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_from_toml_str_errors() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_depth = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            EngineConfig::from_toml_str("max_height = 40"),
            Err(ConfigError::InvalidMaxHeight(40))
        );
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default()
            .apply_overrides(env(&[
                (ENV_MAX_HEIGHT, "22"),
                (ENV_TRAVERSAL, "Level_Parallel"),
            ]))
            .unwrap();
        assert_eq!(config.max_height(), 22);
        assert_eq!(config.traversal(), TraversalMode::LevelParallel);

        let untouched = EngineConfig::default().apply_overrides(env(&[])).unwrap();
        assert_eq!(untouched, EngineConfig::default());
    }

    #[test]
    fn test_override_errors() {
        assert!(matches!(
            EngineConfig::default().apply_overrides(env(&[(ENV_MAX_HEIGHT, "tall")])),
            Err(ConfigError::InvalidParameter {
                name: "max_height",
                ..
            })
        ));
        assert!(matches!(
            EngineConfig::default().apply_overrides(env(&[(ENV_TRAVERSAL, "random")])),
            Err(ConfigError::InvalidParameter {
                name: "traversal",
                ..
            })
        ));
        assert_eq!(
            EngineConfig::default().apply_overrides(env(&[(ENV_MAX_HEIGHT, "31")])),
            Err(ConfigError::InvalidMaxHeight(31))
        );
    }

    #[test]
    fn test_override_lowers_warn_height() {
        let config = EngineConfig::default()
            .apply_overrides(env(&[(ENV_MAX_HEIGHT, "8")]))
            .unwrap();
        assert_eq!(config.max_height(), 8);
        assert_eq!(config.warn_height(), 8);
    }
}
