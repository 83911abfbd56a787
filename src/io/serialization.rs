// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Standalone project files.
//!
//! Projects normally live in the key-value store; this module reads and
//! writes them as self-contained YAML or JSON documents, chosen by the
//! file extension.

use crate::models::project::ProjectData;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// File format of a standalone project document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Export project data to YAML format.
pub fn export_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export project data to JSON format.
pub fn export_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import project data from YAML format.
pub fn import_yaml(path: &Path) -> Result<ProjectData> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_yaml::from_str(&yaml)
        .with_context(|| format!("Invalid project file {}", path.display()))?;
    Ok(data)
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<ProjectData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&json)
        .with_context(|| format!("Invalid project file {}", path.display()))?;
    Ok(data)
}

/// Write `data` in the format implied by `path`.
pub fn export_project(data: &ProjectData, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Json => export_json(data, path),
        FileFormat::Yaml => export_yaml(data, path),
    }?;
    log::info!("Wrote project {:?} to {}", data.project_name, path.display());
    Ok(())
}

/// Read a project in the format implied by `path`.
pub fn import_project(path: &Path) -> Result<ProjectData> {
    let data = match FileFormat::from_path(path)? {
        FileFormat::Json => import_json(path),
        FileFormat::Yaml => import_yaml(path),
    }?;
    log::info!(
        "Read project {:?} ({} elements) from {}",
        data.project_name,
        data.elements.len(),
        path.display()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::{ElementKind, ElementPatch, ShapeKind};
    use crate::models::project::DesignState;

    fn sample() -> ProjectData {
        let mut state = DesignState::new();
        state.set_project_name("Ana & Bruno");
        state.add_element(ElementKind::Text, ElementPatch::content("HELLO"));
        state.add_element(ElementKind::Shape(ShapeKind::Heart), ElementPatch::default());
        state.snapshot()
    }

    #[test]
    fn test_json_and_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let project = sample();
        for name in ["design.json", "design.yaml", "design.YML"] {
            let path = dir.path().join(name);
            export_project(&project, &path).unwrap();
            assert_eq!(import_project(&path).unwrap(), project);
        }
    }

    #[test]
    fn test_persisted_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.json");
        export_project(&sample(), &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"projectName\""));
        assert!(raw.contains("\"canvasSize\""));
        assert!(raw.contains("\"zIndex\""));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export_project(&sample(), &dir.path().join("design.txt")).is_err());
        assert!(import_project(&dir.path().join("design")).is_err());
    }
}
