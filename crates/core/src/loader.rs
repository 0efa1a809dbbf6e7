//! Manifest loading from disk
//!
//! Reads a manifest file, decodes it with [`Manifest::from_slice`] and records
//! where it came from. Decoding itself never logs; the loader reports unknown
//! keys at DEBUG and consistency problems at WARN. Neither stops a load.
//!
//! ## Discovery order
//!
//! 1. `.devcontainer/devcontainer.json`
//! 2. `.devcontainer.json` in the workspace root

use crate::errors::{ConfigError, ManifestError, Result};
use crate::manifest::Manifest;
use indexmap::IndexMap;
use serde::de::IgnoredAny;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Top-level keys the manifest model understands.
const KNOWN_KEYS: &[&str] = &[
    "name",
    "features",
    "overrideFeatureInstallOrder",
    "forwardPorts",
    "portAttributes",
    "otherPortsAttributes",
    "updateRemoteUserUID",
    "remoteEnv",
    "remoteUser",
    "initializeCommand",
    "onCreateCommand",
    "updateContentCommand",
    "postCreateCommand",
    "postStartCommand",
    "postAttachCommand",
    "waitFor",
    "userEnvProbe",
    "hostRequirements",
    "customizations",
    "shutdownAction",
    "overrideCommand",
    "workspaceFolder",
    "settings",
    "extensions",
    "devPort",
    "image",
    "appPorts",
    "containerEnv",
    "containerUser",
    "mounts",
    "runArgs",
    "workspaceMount",
    "dockerComposeFile",
    "string",
    "runServices",
    "dockerFile",
    "context",
    "build",
];

/// Loads manifests from the filesystem.
///
/// ## Example
///
/// ```rust
/// use devmanifest_core::loader::ManifestLoader;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let manifest = ManifestLoader::load_from_path(Path::new(".devcontainer/devcontainer.json"))?;
/// println!("Loaded {:?} from {:?}", manifest.name, manifest.origin);
/// # Ok(())
/// # }
/// ```
pub struct ManifestLoader;

impl ManifestLoader {
    /// Find the manifest inside a workspace folder.
    ///
    /// Returns `Ok(None)` when the workspace exists but holds no manifest.
    ///
    /// ## Errors
    ///
    /// - `ConfigError::NotFound` if `workspace` does not exist
    #[instrument(skip_all, fields(workspace = %workspace.display()))]
    pub fn discover(workspace: &Path) -> Result<Option<PathBuf>> {
        if !workspace.exists() {
            return Err(ConfigError::NotFound {
                path: workspace.display().to_string(),
            }
            .into());
        }

        let candidates = [
            workspace.join(".devcontainer").join("devcontainer.json"),
            workspace.join(".devcontainer.json"),
        ];
        for candidate in candidates {
            debug!("Checking {}", candidate.display());
            if candidate.is_file() {
                debug!("Found manifest: {}", candidate.display());
                return Ok(Some(candidate));
            }
        }

        debug!("No manifest found in {}", workspace.display());
        Ok(None)
    }

    /// Load a manifest file.
    ///
    /// The returned manifest's `origin` is the path as given.
    ///
    /// ## Errors
    ///
    /// - `ConfigError::NotFound` if the file doesn't exist
    /// - `ConfigError::Io` for read failures
    /// - `ConfigError::Decode` for malformed JSON or unsupported field shapes
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<Manifest> {
        debug!("Loading manifest from {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let bytes = std::fs::read(path).map_err(|e| {
            debug!("Failed to read manifest file: {}", e);
            ManifestError::Config(ConfigError::Io(e))
        })?;

        let manifest = Manifest::from_slice(&bytes)
            .map_err(|e| {
                debug!("Failed to decode manifest: {}", e);
                ConfigError::Decode(e)
            })?
            .with_origin(path.display().to_string());

        Self::log_unknown_keys(&bytes);
        Self::report_inconsistencies(&manifest);

        debug!(
            "Successfully loaded manifest with name: {:?}",
            manifest.name
        );
        Ok(manifest)
    }

    /// Load from an explicit path if one is given, otherwise discover the
    /// manifest inside `workspace`.
    pub fn load_from_workspace(workspace: &Path, explicit: Option<&Path>) -> Result<Manifest> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match Self::discover(workspace)? {
            Some(path) => Self::load_from_path(&path),
            None => Err(ConfigError::NotFound {
                path: workspace
                    .join(".devcontainer")
                    .join("devcontainer.json")
                    .display()
                    .to_string(),
            }
            .into()),
        }
    }

    /// Log top-level keys the model does not know about at DEBUG level.
    fn log_unknown_keys(bytes: &[u8]) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        // The bytes already decoded once, so this cannot fail on syntax.
        let Ok(keys) = serde_json::from_slice::<IndexMap<String, IgnoredAny>>(bytes) else {
            return;
        };
        for key in keys.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!("Unknown manifest key '{}' - will be ignored", key);
            }
        }
    }

    fn report_inconsistencies(manifest: &Manifest) {
        let kinds = manifest.provisioning_kinds();
        if kinds.len() > 1 {
            let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
            warn!(
                "Manifest populates more than one provisioning variant ({}); consumers pick the first",
                names.join(", ")
            );
        }

        for id in manifest.unknown_install_order_ids() {
            warn!(
                "overrideFeatureInstallOrder references '{}', which is not in features",
                id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeError;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_sets_origin() -> anyhow::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(br#"{"name": "demo", "image": "alpine:3.19"}"#)?;

        let manifest = ManifestLoader::load_from_path(temp_file.path())?;
        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert_eq!(
            manifest.origin.as_deref(),
            Some(temp_file.path().display().to_string().as_str())
        );
        Ok(())
    }

    #[test]
    fn test_load_file_not_found() {
        let result = ManifestLoader::load_from_path(Path::new("nonexistent.json"));
        match result.unwrap_err() {
            ManifestError::Config(ConfigError::NotFound { path }) => {
                assert!(path.contains("nonexistent.json"));
            }
            other => panic!("Expected Config(NotFound) error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_unsupported_type() -> anyhow::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(br#"{"postCreateCommand": {"bad": "shape"}}"#)?;

        match ManifestLoader::load_from_path(temp_file.path()).unwrap_err() {
            ManifestError::Config(ConfigError::Decode(DecodeError::UnsupportedType {
                line, ..
            })) => assert_eq!(line, 1),
            other => panic!("Expected unsupported type error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_load_rejects_comments() -> anyhow::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"{\n  // comment\n  \"name\": \"x\"\n}")?;

        assert!(matches!(
            ManifestLoader::load_from_path(temp_file.path()),
            Err(ManifestError::Config(ConfigError::Decode(
                DecodeError::Syntax(_)
            )))
        ));
        Ok(())
    }

    #[test]
    fn test_discover_priority() -> anyhow::Result<()> {
        let workspace = TempDir::new()?;
        assert_eq!(ManifestLoader::discover(workspace.path())?, None);

        let root_manifest = workspace.path().join(".devcontainer.json");
        fs::write(&root_manifest, "{}")?;
        assert_eq!(
            ManifestLoader::discover(workspace.path())?,
            Some(root_manifest)
        );

        fs::create_dir(workspace.path().join(".devcontainer"))?;
        let nested = workspace.path().join(".devcontainer/devcontainer.json");
        fs::write(&nested, "{}")?;
        assert_eq!(ManifestLoader::discover(workspace.path())?, Some(nested));
        Ok(())
    }

    #[test]
    fn test_discover_missing_workspace() {
        let result = ManifestLoader::discover(Path::new("/definitely/not/a/workspace"));
        assert!(matches!(
            result,
            Err(ManifestError::Config(ConfigError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_load_from_workspace() -> anyhow::Result<()> {
        let workspace = TempDir::new()?;
        assert!(matches!(
            ManifestLoader::load_from_workspace(workspace.path(), None),
            Err(ManifestError::Config(ConfigError::NotFound { .. }))
        ));

        fs::write(
            workspace.path().join(".devcontainer.json"),
            r#"{"name": "discovered"}"#,
        )?;
        let explicit = workspace.path().join("custom.json");
        fs::write(&explicit, r#"{"name": "explicit"}"#)?;

        let discovered = ManifestLoader::load_from_workspace(workspace.path(), None)?;
        assert_eq!(discovered.name.as_deref(), Some("discovered"));

        let chosen = ManifestLoader::load_from_workspace(workspace.path(), Some(&explicit))?;
        assert_eq!(chosen.name.as_deref(), Some("explicit"));
        Ok(())
    }
}
