//! Tests for db::factory and config loading - repository selection from
//! environment variables and `rapport.toml`.

mod support;

use std::io::Write;
use std::str::FromStr;

use rapport::config::AppConfig;
use rapport::db::factory::{RepositoryFactory, RepositoryType};
use rapport::db::TemplateRepository;

#[test]
fn test_repository_type_from_str_aliases() {
    assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);
    assert_eq!(RepositoryType::from_str("sqlite3").unwrap(), RepositoryType::Sqlite);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("invalid");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None), ("SQLITE_PATH", None)], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_with_sqlite_path() {
    support::with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("SQLITE_PATH", Some("data.db"))],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Sqlite);
        },
    );
}

#[test]
fn test_repository_type_from_env_explicit_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("SQLITE_PATH", Some("data.db")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_invalid_falls_back_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("cassandra"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_from_config_env_override() {
    let config = AppConfig::from_toml_str("[repository]\ntype = \"sqlite\"\n").unwrap();

    let repo = support::with_scoped_env(
        &[("REPOSITORY_TYPE", Some("local")), ("SQLITE_PATH", None)],
        || RepositoryFactory::from_config(&config),
    )
    .unwrap();

    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_from_config_rejects_unknown_type() {
    let config = AppConfig::from_toml_str("[repository]\ntype = \"mongo\"\n").unwrap();

    let result = support::with_scoped_env(&[("REPOSITORY_TYPE", None)], || {
        RepositoryFactory::from_config(&config)
    });
    assert!(result.is_err());
}

#[test]
fn test_load_reads_file_and_applies_server_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[server]\nhost = \"127.0.0.1\"\nport = 9000\n\n[attention]\nneglect_weeks = 6"
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let config = support::with_scoped_env(
        &[
            ("RAPPORT_CONFIG", Some(path.as_str())),
            ("HOST", None),
            ("PORT", Some("9100")),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.server.bind_address(), "127.0.0.1:9100");
    assert_eq!(config.attention.neglect_weeks, 6);
}

#[test]
fn test_load_ignores_invalid_port() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 9000").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let config = support::with_scoped_env(
        &[
            ("RAPPORT_CONFIG", Some(path.as_str())),
            ("HOST", None),
            ("PORT", Some("not-a-port")),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.server.port, 9000);
}

#[test]
fn test_load_missing_explicit_file_is_error() {
    let result = support::with_scoped_env(
        &[("RAPPORT_CONFIG", Some("/definitely/not/here/rapport.toml"))],
        AppConfig::load,
    );
    assert!(result.is_err());
}
