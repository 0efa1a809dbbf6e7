//! Check command implementation
//!
//! `devmanifest check` decodes the manifest and summarizes what a launcher
//! would act on: provisioning variant(s), lifecycle hooks, forwarded ports and
//! host sizing. Consistency problems are reported as warnings; only a load or
//! decode failure makes the command fail.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use devmanifest_core::io::Output;
use devmanifest_core::loader::ManifestLoader;
use devmanifest_core::manifest::{LifecycleHook, Manifest, Provisioning};
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;

/// Check command arguments
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub workspace_folder: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output_format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEntry {
    pub hook: LifecycleHook,
    /// `shell` for a one-element command, `exec` for a longer argument list
    pub form: &'static str,
    pub command: Vec<String>,
}

/// Summary of a decoded manifest
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub provisioning: Vec<Provisioning>,
    pub lifecycle: Vec<LifecycleEntry>,
    pub wait_for: String,
    pub forward_ports: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let provisioning = manifest.provisioning_kinds();
        let mut warnings = Vec::new();

        match provisioning.len() {
            0 => warnings.push(
                "No image, dockerFile or dockerComposeFile is set".to_string(),
            ),
            1 => {}
            _ => warnings.push(format!(
                "Multiple provisioning variants are set ({}); '{}' takes precedence",
                provisioning
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                provisioning[0]
            )),
        }

        if provisioning.contains(&Provisioning::Compose) && manifest.compose.service.is_none() {
            warnings.push("dockerComposeFile is set but no service is named".to_string());
        }

        for id in manifest.unknown_install_order_ids() {
            warnings.push(format!(
                "overrideFeatureInstallOrder references unknown feature '{}'",
                id
            ));
        }

        let requirements = &manifest.host_requirements;
        if let Err(e) = requirements.memory_bytes() {
            warnings.push(format!("hostRequirements.memory: {}", e));
        }
        if let Err(e) = requirements.storage_bytes() {
            warnings.push(format!("hostRequirements.storage: {}", e));
        }

        let lifecycle = manifest
            .lifecycle_commands()
            .map(|(hook, command)| LifecycleEntry {
                hook,
                form: if command.len() == 1 { "shell" } else { "exec" },
                command: command.to_vec(),
            })
            .collect();

        Self {
            name: manifest.name.clone(),
            origin: manifest.origin.clone(),
            provisioning,
            lifecycle,
            wait_for: manifest.wait_for_or_default().to_string(),
            forward_ports: manifest.forward_port_tokens(),
            warnings,
        }
    }

    fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(format!(
            "Manifest: {}",
            self.name.as_deref().unwrap_or("(unnamed)")
        ));
        if let Some(origin) = &self.origin {
            lines.push(format!("Origin: {}", origin));
        }
        let provisioning = if self.provisioning.is_empty() {
            "none".to_string()
        } else {
            self.provisioning
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("Provisioning: {}", provisioning));
        for entry in &self.lifecycle {
            lines.push(format!(
                "  {} ({}): {}",
                entry.hook,
                entry.form,
                entry.command.join(" ")
            ));
        }
        lines.push(format!("Wait for: {}", self.wait_for));
        if !self.forward_ports.is_empty() {
            lines.push(format!("Forward ports: {}", self.forward_ports.join(", ")));
        }
        for warning in &self.warnings {
            lines.push(format!("Warning: {}", warning));
        }
        lines
    }
}

#[instrument(skip_all)]
pub fn execute_check(args: CheckArgs) -> Result<()> {
    let manifest =
        ManifestLoader::load_from_workspace(&args.workspace_folder, args.config_path.as_deref())
            .context("Failed to load devcontainer manifest")?;

    let report = CheckReport::from_manifest(&manifest);
    let mut output = Output::stdout();
    match args.output_format {
        OutputFormat::Json => output.write_json(&report)?,
        OutputFormat::Text => {
            let lines = report.text_lines();
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            output.write_lines(&refs)?;
        }
    }
    Ok(())
}
