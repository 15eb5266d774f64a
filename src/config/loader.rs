//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! parameter versions and currency references from YAML files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::implied_rebates;
use crate::engine::EmployerCostEngine;
use crate::error::{EngineError, EngineResult};
use crate::resolution::{ParameterStore, ReferenceTable};

use super::defaults::EngineDefaults;
use super::types::{ParameterVersion, PayrollMetadata, ReferenceSeries};

/// Published rebates may differ from the implied ones by rounding.
const REBATE_TOLERANCE_UTM: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates every parameter version and builds the in-memory stores the
/// engine resolves against.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/cl/
/// ├── payroll.yaml        # Country metadata, active version, engine defaults
/// ├── references.yaml     # UF, UTM and IMM series
/// └── versions/
///     ├── cl-2025-01.yaml # One parameter version per file
///     └── cl-2025-07.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_cost_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/cl").unwrap();
///
/// for version in loader.versions() {
///     println!("{}: {}", version.id, version.data.version_metadata.name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    metadata: PayrollMetadata,
    versions: Vec<ParameterVersion>,
    references: ReferenceSeries,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/cl")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A parameter version is inconsistent, or two share an id
    /// - The active version is not among the loaded versions
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PayrollMetadata>(&path.join("payroll.yaml"))?;
        let references = Self::load_yaml::<ReferenceSeries>(&path.join("references.yaml"))?;
        let versions = Self::load_versions(&path.join("versions"))?;

        for version in &versions {
            version.validate()?;
            Self::check_rebates(version);
        }

        let loader = Self {
            metadata,
            versions,
            references,
        };
        // Surface duplicate ids and a dangling active version at load time.
        loader.parameter_store()?;
        loader.reference_table()?;

        info!(
            path = %path.display(),
            versions = loader.versions.len(),
            active_version = ?loader.metadata.active_version,
            "Loaded payroll configuration"
        );
        Ok(loader)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all version files from the versions directory, sorted by
    /// effective date.
    fn load_versions(versions_dir: &Path) -> EngineResult<Vec<ParameterVersion>> {
        let versions_dir_str = versions_dir.display().to_string();

        if !versions_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: versions_dir_str,
            });
        }

        let entries = fs::read_dir(versions_dir).map_err(|_| EngineError::ConfigNotFound {
            path: versions_dir_str.clone(),
        })?;

        let mut versions = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: versions_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                versions.push(Self::load_yaml::<ParameterVersion>(&path)?);
            }
        }

        if versions.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no version files found)", versions_dir_str),
            });
        }

        versions.sort_by(|a, b| a.effective_from.cmp(&b.effective_from).then(a.id.cmp(&b.id)));
        Ok(versions)
    }

    /// Warns when a published rebate disagrees with the marginal schedule.
    fn check_rebates(version: &ParameterVersion) {
        let brackets = &version.data.tax_brackets;
        for (index, (bracket, implied)) in brackets
            .iter()
            .zip(implied_rebates(brackets))
            .enumerate()
        {
            if (bracket.rebate - implied).abs() > REBATE_TOLERANCE_UTM {
                warn!(
                    version_id = %version.id,
                    bracket = index + 1,
                    published = %bracket.rebate,
                    implied = %implied,
                    "Published tax rebate disagrees with the bracket schedule"
                );
            }
        }
    }

    /// Returns the payroll metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        &self.metadata
    }

    /// Returns every loaded version, sorted by effective date.
    pub fn versions(&self) -> &[ParameterVersion] {
        &self.versions
    }

    /// Returns the currency reference series.
    pub fn references(&self) -> &ReferenceSeries {
        &self.references
    }

    /// Returns the engine defaults from `payroll.yaml`.
    pub fn defaults(&self) -> &EngineDefaults {
        &self.metadata.engine_defaults
    }

    /// Builds a parameter store with the configured active version.
    pub fn parameter_store(&self) -> EngineResult<ParameterStore> {
        ParameterStore::new(self.versions.clone(), self.metadata.active_version.clone())
    }

    /// Builds a reference table from the configured series.
    pub fn reference_table(&self) -> EngineResult<ReferenceTable> {
        ReferenceTable::new(self.references.clone())
    }

    /// Builds an engine backed by this configuration.
    pub fn engine(&self) -> EngineResult<EmployerCostEngine> {
        Ok(EmployerCostEngine::with_defaults(
            Arc::new(self.parameter_store()?),
            Arc::new(self.reference_table()?),
            self.defaults().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/cl"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().country, "CL");
        assert_eq!(loader.metadata().currency, "CLP");
        assert_eq!(loader.metadata().active_version.as_deref(), Some("cl-2025-07"));
    }

    #[test]
    fn test_versions_sorted_by_effective_date() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let ids: Vec<&str> = loader.versions().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["cl-2025-01", "cl-2025-07"]);
    }

    #[test]
    fn test_version_parameters_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let version = &loader.versions()[0];

        assert_eq!(version.data.caps.pension_uf, dec("87.8"));
        assert_eq!(version.data.caps.afc_uf, dec("131.9"));
        assert_eq!(version.data.sis.employer_rate, dec("0.0149"));
        assert_eq!(
            version.data.afp.commission_for("habitat").unwrap().commission_rate,
            dec("0.0127")
        );
        assert_eq!(version.data.tax_brackets.len(), 8);
        assert_eq!(version.data.tax_brackets[7].upper_bound, None);
    }

    #[test]
    fn test_published_rebates_match_schedule() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        for version in loader.versions() {
            let implied = implied_rebates(&version.data.tax_brackets);
            for (bracket, rebate) in version.data.tax_brackets.iter().zip(implied) {
                assert!((bracket.rebate - rebate).abs() <= REBATE_TOLERANCE_UTM);
            }
        }
    }

    #[test]
    fn test_engine_defaults_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(loader.defaults().default_afp_name, "habitat");
        assert_eq!(loader.defaults().fallback_work_injury_rate, dec("0.0093"));
    }

    #[test]
    fn test_reference_series_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert!(!loader.references().uf.is_empty());
        assert!(!loader.references().utm.is_empty());
        assert_eq!(loader.references().imm[0].value, dec("500000"));
    }

    #[tokio::test]
    async fn test_parameter_store_uses_active_version() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let store = loader.parameter_store().unwrap();

        assert_eq!(store.active_id().await.as_deref(), Some("cl-2025-07"));
        assert_eq!(store.version_ids(), vec!["cl-2025-01", "cl-2025-07"]);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
