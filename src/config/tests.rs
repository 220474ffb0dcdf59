use super::*;
use serial_test::serial;
use std::env;
use std::io::Write as _;
use std::net::IpAddr;
use std::path::PathBuf;

/// A config file path that never exists; keeps `from_env` tests independent
/// of any `config.local.json` in the working directory.
const NO_FILE: &str = "/nonexistent/gbcheck-test-config.json";

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_gbcheck_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("GBCHECK_PORT");
        env::remove_var("GBCHECK_BIND_ADDR");
        env::remove_var("GBCHECK_REGISTRY_URL");
        env::remove_var("GBCHECK_RETRIEVAL_URL");
        env::remove_var("GBCHECK_RETRIEVAL_API_KEY");
        env::remove_var("GBCHECK_RULES_DATASET_IDS");
        env::remove_var("GBCHECK_GB_DATASET_IDS");
        env::remove_var("GBCHECK_CACHE_PATH");
        env::remove_var("GBCHECK_ARTIFACTS_DIR");
        env::remove_var("GBCHECK_CONFIG_FILE");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.registry_url.is_none());
    assert!(config.retrieval_url.is_none());
    assert!(config.rules_dataset_ids.is_empty());
    assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
    assert!(config.artifacts_dir.is_none());
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_gbcheck_env();

    with_env_vars(&[(Config::ENV_CONFIG_FILE, NO_FILE)], || {
        let config = Config::from_env().expect("should parse with defaults");

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.bind_addr,
            IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
        );
        assert!(config.registry_url.is_none());
    });
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_gbcheck_env();

    with_env_vars(
        &[(Config::ENV_CONFIG_FILE, NO_FILE), ("GBCHECK_PORT", "3000")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.port, 3000);
        },
    );
}

#[test]
#[serial]
fn test_from_env_custom_bind_addr() {
    clear_gbcheck_env();

    with_env_vars(
        &[
            (Config::ENV_CONFIG_FILE, NO_FILE),
            ("GBCHECK_BIND_ADDR", "0.0.0.0"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(
                config.bind_addr,
                IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
            );
        },
    );
}

#[test]
#[serial]
fn test_from_env_endpoints_and_datasets() {
    clear_gbcheck_env();

    with_env_vars(
        &[
            (Config::ENV_CONFIG_FILE, NO_FILE),
            ("GBCHECK_REGISTRY_URL", "https://mcp.example.com/mcp"),
            ("GBCHECK_RETRIEVAL_URL", "http://ragflow.local:9380"),
            ("GBCHECK_RETRIEVAL_API_KEY", "ragflow-key"),
            ("GBCHECK_RULES_DATASET_IDS", "ds-rules-1, ds-rules-2"),
            ("GBCHECK_GB_DATASET_IDS", "ds-gb"),
            ("GBCHECK_ARTIFACTS_DIR", "/tmp/gbcheck-docs"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(
                config.registry_url.as_deref(),
                Some("https://mcp.example.com/mcp")
            );
            assert_eq!(
                config.retrieval_url.as_deref(),
                Some("http://ragflow.local:9380")
            );
            assert_eq!(config.retrieval_api_key.as_deref(), Some("ragflow-key"));
            assert_eq!(config.rules_dataset_ids, vec!["ds-rules-1", "ds-rules-2"]);
            assert_eq!(config.gb_dataset_ids, vec!["ds-gb"]);
            assert_eq!(
                config.artifacts_dir,
                Some(PathBuf::from("/tmp/gbcheck-docs"))
            );
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_gbcheck_env();

    with_env_vars(
        &[(Config::ENV_CONFIG_FILE, NO_FILE), ("GBCHECK_PORT", "0")],
        || {
            let result = Config::from_env();
            assert!(result.is_err());

            let err = result.unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort { .. }));
            assert!(err.to_string().contains("invalid port"));
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_gbcheck_env();

    with_env_vars(
        &[
            (Config::ENV_CONFIG_FILE, NO_FILE),
            ("GBCHECK_PORT", "not_a_port"),
        ],
        || {
            let result = Config::from_env();
            assert!(result.is_err());

            let err = result.unwrap_err();
            assert!(matches!(err, ConfigError::PortParseError { .. }));
            assert!(err.to_string().contains("failed to parse port"));
        },
    );
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_gbcheck_env();

    with_env_vars(
        &[
            (Config::ENV_CONFIG_FILE, NO_FILE),
            ("GBCHECK_BIND_ADDR", "not.an.ip.address"),
        ],
        || {
            let result = Config::from_env();
            assert!(result.is_err());

            let err = result.unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
            assert!(err.to_string().contains("failed to parse bind address"));
        },
    );
}

#[test]
#[serial]
fn test_file_values_apply_when_env_unset() {
    clear_gbcheck_env();

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.local.json");
    let mut file = std::fs::File::create(&path).expect("create config file");
    write!(
        file,
        r#"{{
            "port": 9090,
            "registry_url": "https://file.example.com/mcp",
            "rules_dataset_ids": ["file-ds"],
            "cache_path": "/tmp/gbcheck-cache.json"
        }}"#
    )
    .expect("write config file");

    let config = Config::from_env_and_file(&path).expect("should parse file config");

    assert_eq!(config.port, 9090);
    assert_eq!(
        config.registry_url.as_deref(),
        Some("https://file.example.com/mcp")
    );
    assert_eq!(config.rules_dataset_ids, vec!["file-ds"]);
    assert_eq!(config.cache_path, PathBuf::from("/tmp/gbcheck-cache.json"));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_gbcheck_env();

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.local.json");
    std::fs::write(
        &path,
        r#"{"registry_url": "https://file.example.com/mcp", "port": 9090}"#,
    )
    .expect("write config file");

    with_env_vars(
        &[("GBCHECK_REGISTRY_URL", "https://env.example.com/mcp")],
        || {
            let config = Config::from_env_and_file(&path).expect("should parse");
            assert_eq!(
                config.registry_url.as_deref(),
                Some("https://env.example.com/mcp")
            );
            // Untouched by env, so the file value stands.
            assert_eq!(config.port, 9090);
        },
    );
}

#[test]
#[serial]
fn test_missing_file_is_not_an_error() {
    clear_gbcheck_env();

    let config = Config::from_env_and_file(Path::new(NO_FILE)).expect("missing file is fine");
    assert_eq!(config.port, 8080);
}

#[test]
#[serial]
fn test_corrupt_file_is_an_error() {
    clear_gbcheck_env();

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.local.json");
    std::fs::write(&path, "{not json").expect("write config file");

    let result = Config::from_env_and_file(&path);
    assert!(matches!(result, Err(ConfigError::FileParse { .. })));
}

#[test]
fn test_validate_cache_path_is_directory() {
    let config = Config {
        cache_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src"),
        ..Default::default()
    };

    let result = config.validate();
    assert!(matches!(result, Err(ConfigError::NotAFile { .. })));
}

#[test]
fn test_validate_retrieval_url_requires_key() {
    let config = Config {
        retrieval_url: Some("http://ragflow.local:9380".to_string()),
        ..Default::default()
    };

    let result = config.validate();
    assert!(matches!(result, Err(ConfigError::MissingRetrievalKey)));
}

#[test]
fn test_validate_success_with_defaults() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("invalid port"));
    assert!(err.to_string().contains("0"));
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::FileParse {
        path: PathBuf::from("/some/config.json"),
        message: "unexpected token".to_string(),
    };
    assert!(err.to_string().contains("/some/config.json"));
    assert!(err.to_string().contains("unexpected token"));
}
