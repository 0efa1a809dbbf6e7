//! Integration tests for manifest decoding
//!
//! These tests load the sample manifests under `fixtures/manifests` from disk
//! and check the normalized model end to end.

use devmanifest_core::errors::{ConfigError, DecodeError, ManifestError};
use devmanifest_core::loader::ManifestLoader;
use devmanifest_core::manifest::{LifecycleHook, Manifest, Provisioning};
use devmanifest_core::shorthand::PortSpecifier;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/manifests")
        .join(name)
}

#[test]
fn test_load_image_fixture() {
    let manifest = ManifestLoader::load_from_path(&fixture("image.json"))
        .expect("Should successfully load image fixture");

    assert_eq!(manifest.name.as_deref(), Some("Rust Development Container"));
    assert_eq!(manifest.provisioning(), Some(Provisioning::Image));
    assert_eq!(
        manifest.image_container.image.as_deref(),
        Some("mcr.microsoft.com/devcontainers/rust:1")
    );

    // Shorthand fields
    assert_eq!(manifest.initialize_command, vec!["echo initializing"]);
    assert_eq!(manifest.on_create_command, vec!["cargo", "fetch"]);
    assert_eq!(manifest.post_create_command, vec!["cargo build"]);
    assert!(manifest.post_attach_command.is_empty());
    assert_eq!(manifest.non_compose.app_port, vec!["9000"]);

    // Ports
    assert_eq!(manifest.forward_port_tokens(), vec!["3000", "8080:8081"]);
    assert_eq!(
        manifest.forward_ports[0],
        PortSpecifier::Number("3000".to_string())
    );
    assert!(manifest.forward_ports[1].is_mapping());
    let web = &manifest.ports_attributes["3000"];
    assert_eq!(web.label_or_default(), "Web");
    assert_eq!(web.on_auto_forward_or_default(), "openBrowser");

    // Container settings
    assert_eq!(
        manifest.non_compose.container_env.get("RUST_LOG"),
        Some(&"debug".to_string())
    );
    assert_eq!(
        manifest.non_compose.run_args,
        vec!["--init", "--cap-add=SYS_PTRACE"]
    );
    assert_eq!(manifest.non_compose.mounts.len(), 1);
    assert_eq!(manifest.remote_user.as_deref(), Some("vscode"));

    // Features keep their declaration order
    let ids: Vec<&str> = manifest.features.keys().map(String::as_str).collect();
    assert_eq!(
        ids,
        vec![
            "ghcr.io/devcontainers/features/common-utils:2",
            "ghcr.io/devcontainers/features/node:1"
        ]
    );
    assert!(manifest.unknown_install_order_ids().is_empty());

    // Host requirements
    assert_eq!(manifest.host_requirements.cpus, Some(4));
    assert_eq!(
        manifest.host_requirements.memory_bytes().unwrap(),
        Some(8 * 1024 * 1024 * 1024)
    );

    assert_eq!(manifest.wait_for_or_default(), "onCreateCommand");
    assert_eq!(manifest.user_env_probe_or_default(), "loginInteractiveShell");
    assert_eq!(manifest.shutdown_action.as_deref(), Some("stopContainer"));
    assert!(manifest.override_command_or_default());
    assert!(manifest.customizations.contains_key("vscode"));
}

#[test]
fn test_load_dockerfile_fixture() {
    let manifest = ManifestLoader::load_from_path(&fixture("dockerfile.json"))
        .expect("Should successfully load dockerfile fixture");

    assert_eq!(manifest.provisioning_kinds(), vec![Provisioning::Dockerfile]);
    // build.dockerfile wins over the top-level dockerFile
    assert_eq!(manifest.dockerfile_path(), Some("Dockerfile.dev"));
    assert_eq!(manifest.context_path(), Some(".."));

    let build = &manifest.dockerfile_container.build;
    assert_eq!(build.target.as_deref(), Some("development"));
    assert_eq!(build.args.get("VARIANT"), Some(&"bookworm".to_string()));
    assert_eq!(
        build.cache_from,
        vec!["ghcr.io/example/app:cache", "ghcr.io/example/app:latest"]
    );

    assert_eq!(manifest.non_compose.app_port, vec!["8000:8010"]);
    assert_eq!(manifest.non_compose.container_user.as_deref(), Some("node"));
    assert_eq!(
        manifest.lifecycle_command(LifecycleHook::PostStart),
        &vec!["npm", "run", "watch"]
    );
}

#[test]
fn test_load_compose_fixture() {
    let manifest = ManifestLoader::load_from_path(&fixture("compose.json"))
        .expect("Should successfully load compose fixture");

    assert_eq!(manifest.provisioning(), Some(Provisioning::Compose));
    assert_eq!(
        manifest.compose.docker_compose_file,
        vec!["docker-compose.yml", "docker-compose.dev.yml"]
    );
    assert_eq!(manifest.compose.service.as_deref(), Some("web"));
    assert_eq!(manifest.compose_services(), vec!["web", "web", "db"]);
    assert_eq!(manifest.shutdown_action.as_deref(), Some("stopCompose"));
    assert_eq!(manifest.extensions, vec!["dbaeumer.vscode-eslint"]);
    assert_eq!(manifest.dev_port, Some(8000));

    let hooks: Vec<LifecycleHook> = manifest.lifecycle_commands().map(|(h, _)| h).collect();
    assert_eq!(hooks, vec![LifecycleHook::PostAttach]);
}

#[test]
fn test_load_invalid_command_fixture() {
    let err = ManifestLoader::load_from_path(&fixture("invalid-command.json")).unwrap_err();
    match err {
        ManifestError::Config(ConfigError::Decode(decode)) => {
            assert!(decode.is_unsupported_type(), "got {decode:?}");
            assert!(decode.to_string().starts_with("unsupported type"));
        }
        other => panic!("Expected decode error, got {other:?}"),
    }
}

#[test]
fn test_documented_decode_scenarios() {
    let manifest: Manifest = r#"{"postCreateCommand": "echo hi"}"#.parse().unwrap();
    assert_eq!(manifest.post_create_command, vec!["echo hi"]);

    let manifest: Manifest = r#"{"postCreateCommand": ["echo", "hi"]}"#.parse().unwrap();
    assert_eq!(manifest.post_create_command, vec!["echo", "hi"]);

    let manifest: Manifest = r#"{"forwardPorts": [3000, "8080:8081"]}"#.parse().unwrap();
    assert_eq!(manifest.forward_port_tokens(), vec!["3000", "8080:8081"]);

    let manifest: Manifest = r#"{"dockerComposeFile": ["a.yml", "b.yml"], "string": "web"}"#
        .parse()
        .unwrap();
    assert_eq!(manifest.compose.docker_compose_file, vec!["a.yml", "b.yml"]);
    assert_eq!(manifest.compose.service.as_deref(), Some("web"));

    let err = r#"{"postCreateCommand": {"bad": "shape"}}"#
        .parse::<Manifest>()
        .unwrap_err();
    assert!(err.is_unsupported_type());
}

#[test]
fn test_non_string_array_element_rejected_in_every_command_field() {
    for key in [
        "initializeCommand",
        "onCreateCommand",
        "updateContentCommand",
        "postCreateCommand",
        "postStartCommand",
        "postAttachCommand",
        "dockerComposeFile",
        "appPorts",
    ] {
        let json = format!(r#"{{"{}": ["ok", 1]}}"#, key);
        let err = json.parse::<Manifest>().unwrap_err();
        assert!(err.is_unsupported_type(), "{key}: got {err:?}");
    }
}

#[test]
fn test_syntax_errors_are_distinct_from_unsupported_type() {
    for json in [r#"{"name": "#, "[1, 2]", r#"{"name": 5}"#, r#"{"forwardPorts": "3000"}"#] {
        let err = json.parse::<Manifest>().unwrap_err();
        assert!(
            matches!(err, DecodeError::Syntax(_)),
            "{json}: expected syntax error, got {err:?}"
        );
    }
}

#[test]
fn test_unknown_keys_are_ignored() {
    let manifest: Manifest = r#"{"totallyUnknownField": 123, "nested": {"a": [1, 2]}}"#
        .parse()
        .unwrap();
    assert_eq!(manifest, Manifest::default());
}

#[test]
fn test_reencode_is_stable() {
    let manifest = ManifestLoader::load_from_path(&fixture("image.json")).unwrap();
    let encoded = serde_json::to_string(&manifest).unwrap();
    let decoded: Manifest = encoded.parse().unwrap();
    // origin is never serialized
    assert_eq!(decoded.with_origin(manifest.origin.clone().unwrap()), manifest);
}

#[test]
fn test_load_both_port_spellings() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("devcontainer.json");
    std::fs::write(
        &path,
        r#"{
            "image": "alpine",
            "appPort": 1,
            "appPorts": 123456789012345678901234567890,
            "portsAttributes": {"3000": {}},
            "portAttributes": {},
            "devPort": 70000,
            "futureNumber": 1e400
        }"#,
    )?;

    let manifest = ManifestLoader::load_from_path(&path)?;
    assert_eq!(
        manifest.non_compose.app_port,
        vec!["123456789012345678901234567890"]
    );
    assert!(manifest.ports_attributes.is_empty());
    assert_eq!(manifest.dev_port, Some(70000));
    Ok(())
}
