//! Saving and loading spray programs.
//!
//! Programs are stored as `.spray` JSON files holding the configuration and
//! some metadata. Discretized points are never written; they are rebuilt from
//! the primitives when the file is loaded.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::configuration::Configuration;

/// Program file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete program file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramFile {
    pub version: String,
    pub metadata: ProgramMetadata,
    pub configuration: Configuration,
}

/// Program metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub source_drawing: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl ProgramFile {
    /// Create a new program file around a configuration
    pub fn new(name: impl Into<String>, configuration: Configuration) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: ProgramMetadata {
                name: name.into(),
                created: now,
                modified: now,
                source_drawing: None,
                description: String::new(),
            },
            configuration,
        }
    }

    /// Save program to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize program")?;

        std::fs::write(path.as_ref(), json).context("Failed to write program file")?;

        tracing::info!("Saved program '{}' to {}", self.metadata.name, path.as_ref().display());
        Ok(())
    }

    /// Load program from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read program file")?;

        let mut program: ProgramFile =
            serde_json::from_str(&content).context("Failed to parse program file")?;

        if program.version != FILE_FORMAT_VERSION {
            bail!(
                "Unsupported program file version {} (expected {})",
                program.version,
                FILE_FORMAT_VERSION
            );
        }

        program.configuration.clamp_selection();

        tracing::debug!(
            "Loaded program '{}' with {} passes",
            program.metadata.name,
            program.configuration.pass_count()
        );
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;
    use crate::trajectory::Trajectory;
    use spraykit_core::Point3D;

    fn program() -> ProgramFile {
        let mut configuration = Configuration::new();
        let index = configuration.add_pass("base coat");
        let pass = configuration.pass_mut(index).unwrap();
        pass.add_trajectory(Trajectory::new(Primitive::Circle {
            p1: Point3D::xy(10.0, 0.0),
            p2: Point3D::xy(0.0, 10.0),
            p3: Point3D::xy(-10.0, 0.0),
        }));
        ProgramFile::new("panel", configuration)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.spray");
        let original = program();
        original.save_to_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("\"points\""));

        let loaded = ProgramFile::load_from_file(&path).unwrap();
        assert_eq!(loaded.metadata.name, "panel");
        assert_eq!(loaded.configuration, original.configuration);
        let trajectory = loaded.configuration.pass(0).unwrap().trajectory(0).unwrap();
        assert_eq!(trajectory.points().len(), 25);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.spray");
        let mut file = program();
        file.version = "9.0".to_string();
        file.save_to_file(&path).unwrap();

        let err = ProgramFile::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported program file version"));
    }

    #[test]
    fn test_selection_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.spray");
        let mut json = serde_json::to_value(program()).unwrap();
        json["configuration"]["current_pass_index"] = serde_json::json!(7);
        std::fs::write(&path, json.to_string()).unwrap();

        let loaded = ProgramFile::load_from_file(&path).unwrap();
        assert_eq!(loaded.configuration.current_pass_index(), 0);
    }
}
