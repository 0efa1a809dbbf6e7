//! Dev container manifest model
//!
//! [`Manifest`] is the typed form of a `devcontainer.json` document. Every key
//! is optional and unknown keys are ignored, so `{}` decodes to an all-default
//! manifest and newer documents keep decoding with older builds.
//!
//! The three ways of provisioning a container (image, Dockerfile, compose)
//! are separate records flattened into the one JSON object. The format does
//! not make them exclusive, so any subset may be populated; see
//! [`Manifest::provisioning_kinds`].
//!
//! Fields documented with a default ("default: notify") are *not* filled in at
//! decode time. The stored field stays absent and the `*_or_default` accessors
//! apply the default explicitly.
//!
//! ## Wire key quirks
//!
//! Three keys deliberately differ from the names used in most published
//! references, because existing manifests rely on them:
//!
//! - the compose primary service is read from `"string"`, not `"service"`
//! - per-port attributes are `"portAttributes"`, not `"portsAttributes"`
//! - application ports are `"appPorts"`, not `"appPort"`
//!
//! The other spellings are ordinary unknown keys and are ignored.

use crate::errors::DecodeError;
use crate::host_requirements::HostRequirements;
use crate::shorthand::{PortSpecifier, StringIntList, StringList};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default for `waitFor` when the manifest leaves it out.
pub const DEFAULT_WAIT_FOR: &str = "updateContentCommand";

/// Default for `userEnvProbe` when the manifest leaves it out.
pub const DEFAULT_USER_ENV_PROBE: &str = "loginInteractiveShell";

/// Default for a port's `onAutoForward`.
pub const DEFAULT_ON_AUTO_FORWARD: &str = "notify";

/// Default for a port's `label`.
pub const DEFAULT_PORT_LABEL: &str = "Application";

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Attributes applied when a port is forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortAttributes {
    /// Action taken when the port is discovered for automatic forwarding.
    /// Default: notify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_auto_forward: Option<String>,

    /// Prompt for elevation when the local port is privileged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub elevate_if_needed: bool,

    /// Label shown in the UI for this port. Default: Application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Warn when the chosen local port cannot be used for forwarding.
    #[serde(default, deserialize_with = "null_as_default")]
    pub require_local_port: bool,

    /// Protocol used when forwarding the port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl PortAttributes {
    pub fn on_auto_forward_or_default(&self) -> &str {
        self.on_auto_forward
            .as_deref()
            .unwrap_or(DEFAULT_ON_AUTO_FORWARD)
    }

    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_PORT_LABEL)
    }
}

/// Direct image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageContainer {
    /// The image the container is created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Options under the `build` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Dockerfile location, relative to the manifest. Takes precedence over
    /// the top-level `dockerFile`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,

    /// Build context location, relative to the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Target stage in a multi-stage build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub args: IndexMap<String, String>,

    /// Images to consider as cache sources.
    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub cache_from: StringList,
}

impl BuildOptions {
    pub fn is_empty(&self) -> bool {
        self == &BuildOptions::default()
    }
}

/// Dockerfile build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DockerfileContainer {
    #[serde(
        rename = "dockerFile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dockerfile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BuildOptions::is_empty"
    )]
    pub build: BuildOptions,
}

/// Docker Compose based setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeContainer {
    /// Compose file(s) used to start the services.
    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub docker_compose_file: StringList,

    /// The service the tooling attaches to.
    // NOTE: the wire key really is "string". Renaming it to "service" would
    // stop existing manifests from decoding.
    #[serde(rename = "string", default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Services to start and stop alongside the primary one.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub run_services: Vec<String>,
}

/// Container settings shared by the image and Dockerfile setups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonComposeBase {
    /// Ports published by the container. A number maps to the same host port;
    /// a string such as `"8000:8010"` is passed through unchanged.
    #[serde(
        rename = "appPorts",
        default,
        skip_serializing_if = "StringIntList::is_empty"
    )]
    pub app_port: StringIntList,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub container_env: IndexMap<String, String>,

    /// User the container runs as. Defaults to the image's user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_user: Option<String>,

    /// `--mount` style specifications.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub mounts: Vec<String>,

    /// Extra arguments for the container run.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub run_args: Vec<String>,

    /// Mount specification for the workspace folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_mount: Option<String>,
}

/// How the container is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Provisioning {
    Image,
    Dockerfile,
    Compose,
}

impl fmt::Display for Provisioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provisioning::Image => "image",
            Provisioning::Dockerfile => "dockerfile",
            Provisioning::Compose => "compose",
        })
    }
}

/// Lifecycle command slots, in execution order.
///
/// Serializes as the manifest key, e.g. `"postCreateCommand"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LifecycleHook {
    #[serde(rename = "initializeCommand")]
    Initialize,
    #[serde(rename = "onCreateCommand")]
    OnCreate,
    #[serde(rename = "updateContentCommand")]
    UpdateContent,
    #[serde(rename = "postCreateCommand")]
    PostCreate,
    #[serde(rename = "postStartCommand")]
    PostStart,
    #[serde(rename = "postAttachCommand")]
    PostAttach,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 6] = [
        LifecycleHook::Initialize,
        LifecycleHook::OnCreate,
        LifecycleHook::UpdateContent,
        LifecycleHook::PostCreate,
        LifecycleHook::PostStart,
        LifecycleHook::PostAttach,
    ];

    /// The manifest key for this hook.
    pub fn wire_key(self) -> &'static str {
        match self {
            LifecycleHook::Initialize => "initializeCommand",
            LifecycleHook::OnCreate => "onCreateCommand",
            LifecycleHook::UpdateContent => "updateContentCommand",
            LifecycleHook::PostCreate => "postCreateCommand",
            LifecycleHook::PostStart => "postStartCommand",
            LifecycleHook::PostAttach => "postAttachCommand",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

/// A decoded `devcontainer.json`.
///
/// Produced once per load by [`Manifest::from_slice`] (or
/// [`ManifestLoader`](crate::loader::ManifestLoader)) and treated as read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Display name for the dev container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Features keyed by identifier; option values are opaque.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub features: IndexMap<String, serde_json::Value>,

    /// Feature ids in the order the user wants them installed. Not checked
    /// against `features` here; see [`Manifest::unknown_install_order_ids`].
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub override_feature_install_order: Vec<String>,

    /// Ports forwarded from the container to the local machine.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub forward_ports: Vec<PortSpecifier>,

    /// Attributes for specific ports, keyed by port or port range.
    #[serde(
        rename = "portAttributes",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub ports_attributes: IndexMap<String, PortAttributes>,

    /// Attributes for ports that match no `portAttributes` entry.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub other_ports_attributes: IndexMap<String, PortAttributes>,

    /// Whether the container user's UID/GID should follow the local user on Linux.
    #[serde(
        rename = "updateRemoteUserUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_remote_user_uid: Option<bool>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub remote_env: IndexMap<String, String>,

    /// User for lifecycle scripts and tool processes. Defaults to the container user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_user: Option<String>,

    /// Runs on the host before anything else.
    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub initialize_command: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub on_create_command: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub update_content_command: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub post_create_command: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub post_start_command: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub post_attach_command: StringList,

    /// Command to wait for before the session continues in the background.
    /// Default: updateContentCommand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,

    /// Shell used to probe the user environment. Default: loginInteractiveShell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_env_probe: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HostRequirements::is_empty"
    )]
    pub host_requirements: HostRequirements,

    /// Tool-specific settings keyed by tool namespace.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub customizations: IndexMap<String, serde_json::Value>,

    /// Action taken when the tool disconnects. Defaults to stopping the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_action: Option<String>,

    /// Whether to replace the image's default command. Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_command: Option<bool>,

    /// Workspace folder path inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_folder: Option<String>,

    /// Deprecated: use `customizations.vscode.settings`.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub settings: IndexMap<String, serde_json::Value>,

    /// Deprecated: use `customizations.vscode.extensions`.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub extensions: Vec<String>,

    /// Deprecated: use `customizations.vscode.devPort`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_port: Option<i64>,

    #[serde(flatten)]
    pub image_container: ImageContainer,

    #[serde(flatten)]
    pub non_compose: NonComposeBase,

    #[serde(flatten)]
    pub compose: ComposeContainer,

    #[serde(flatten)]
    pub dockerfile_container: DockerfileContainer,

    /// Where this manifest was loaded from. Never read from or written to JSON.
    #[serde(skip)]
    pub origin: Option<String>,
}

impl Manifest {
    /// Decode a manifest from raw JSON bytes.
    ///
    /// ```
    /// use devmanifest_core::manifest::Manifest;
    ///
    /// let manifest = Manifest::from_slice(br#"{"postCreateCommand": "echo hi"}"#).unwrap();
    /// assert_eq!(manifest.post_create_command, vec!["echo hi"]);
    /// ```
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError::from_json)
    }

    /// Attach the provenance of this manifest.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn wait_for_or_default(&self) -> &str {
        self.wait_for.as_deref().unwrap_or(DEFAULT_WAIT_FOR)
    }

    pub fn user_env_probe_or_default(&self) -> &str {
        self.user_env_probe
            .as_deref()
            .unwrap_or(DEFAULT_USER_ENV_PROBE)
    }

    pub fn override_command_or_default(&self) -> bool {
        self.override_command.unwrap_or(true)
    }

    /// Every populated provisioning variant, in image, Dockerfile, compose order.
    ///
    /// More than one entry means the manifest is ambiguous; choosing between
    /// them is up to the caller.
    pub fn provisioning_kinds(&self) -> Vec<Provisioning> {
        let mut kinds = Vec::new();
        if self.image_container.image.is_some() {
            kinds.push(Provisioning::Image);
        }
        if self.dockerfile_path().is_some() {
            kinds.push(Provisioning::Dockerfile);
        }
        if !self.compose.docker_compose_file.is_empty() {
            kinds.push(Provisioning::Compose);
        }
        kinds
    }

    /// The first populated provisioning variant, if any.
    pub fn provisioning(&self) -> Option<Provisioning> {
        self.provisioning_kinds().into_iter().next()
    }

    /// Dockerfile location, preferring `build.dockerfile` over `dockerFile`.
    pub fn dockerfile_path(&self) -> Option<&str> {
        let container = &self.dockerfile_container;
        container
            .build
            .dockerfile
            .as_deref()
            .or(container.dockerfile.as_deref())
    }

    /// Build context, preferring `build.context` over `context`.
    pub fn context_path(&self) -> Option<&str> {
        let container = &self.dockerfile_container;
        container
            .build
            .context
            .as_deref()
            .or(container.context.as_deref())
    }

    /// Primary compose service followed by `runServices`.
    pub fn compose_services(&self) -> Vec<String> {
        let mut services = Vec::new();
        if let Some(ref service) = self.compose.service {
            services.push(service.clone());
        }
        services.extend(self.compose.run_services.iter().cloned());
        services
    }

    pub fn lifecycle_command(&self, hook: LifecycleHook) -> &StringList {
        match hook {
            LifecycleHook::Initialize => &self.initialize_command,
            LifecycleHook::OnCreate => &self.on_create_command,
            LifecycleHook::UpdateContent => &self.update_content_command,
            LifecycleHook::PostCreate => &self.post_create_command,
            LifecycleHook::PostStart => &self.post_start_command,
            LifecycleHook::PostAttach => &self.post_attach_command,
        }
    }

    /// Hooks that carry a command, in execution order.
    pub fn lifecycle_commands(&self) -> impl Iterator<Item = (LifecycleHook, &StringList)> + '_ {
        LifecycleHook::ALL
            .into_iter()
            .map(move |hook| (hook, self.lifecycle_command(hook)))
            .filter(|(_, command)| !command.is_empty())
    }

    /// Ids in `overrideFeatureInstallOrder` that are not keys of `features`.
    pub fn unknown_install_order_ids(&self) -> Vec<&str> {
        self.override_feature_install_order
            .iter()
            .filter(|id| !self.features.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// `forwardPorts` as normalized tokens, e.g. `["3000", "8080:8081"]`.
    pub fn forward_port_tokens(&self) -> Vec<String> {
        self.forward_ports
            .iter()
            .map(|port| port.as_str().to_string())
            .collect()
    }
}

impl FromStr for Manifest {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(DecodeError::from_json)
    }
}
