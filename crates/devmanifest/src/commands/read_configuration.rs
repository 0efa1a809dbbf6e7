//! Read configuration command implementation
//!
//! Implements `devmanifest read-configuration`: load the manifest and write its
//! normalized form to stdout as a single JSON object.

use anyhow::{Context, Result};
use devmanifest_core::io::Output;
use devmanifest_core::loader::ManifestLoader;
use devmanifest_core::manifest::Manifest;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Read configuration command arguments
#[derive(Debug, Clone)]
pub struct ReadConfigurationArgs {
    pub workspace_folder: PathBuf,
    pub config_path: Option<PathBuf>,
    pub include_origin: bool,
}

/// stdout payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadConfigurationOutput<'a> {
    pub configuration: &'a Manifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<&'a str>,
}

impl<'a> ReadConfigurationOutput<'a> {
    pub fn new(manifest: &'a Manifest, include_origin: bool) -> Self {
        Self {
            configuration: manifest,
            origin: if include_origin {
                manifest.origin.as_deref()
            } else {
                None
            },
        }
    }
}

#[instrument(skip_all)]
pub fn execute_read_configuration(args: ReadConfigurationArgs) -> Result<()> {
    debug!(
        "Reading configuration for workspace {}",
        args.workspace_folder.display()
    );

    let manifest =
        ManifestLoader::load_from_workspace(&args.workspace_folder, args.config_path.as_deref())
            .context("Failed to load devcontainer manifest")?;

    let mut output = Output::stdout();
    output.write_json(&ReadConfigurationOutput::new(&manifest, args.include_origin))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_shape_without_origin() {
        let manifest: Manifest = r#"{"name": "demo", "postCreateCommand": "make"}"#
            .parse::<Manifest>()
            .unwrap()
            .with_origin("/ws/.devcontainer.json");

        let value = serde_json::to_value(ReadConfigurationOutput::new(&manifest, false)).unwrap();
        assert_eq!(
            value,
            json!({"configuration": {"name": "demo", "postCreateCommand": ["make"]}})
        );
    }

    #[test]
    fn test_output_shape_with_origin() {
        let manifest = Manifest::default().with_origin("/ws/.devcontainer.json");

        let value = serde_json::to_value(ReadConfigurationOutput::new(&manifest, true)).unwrap();
        assert_eq!(
            value,
            json!({"configuration": {}, "origin": "/ws/.devcontainer.json"})
        );
    }
}
