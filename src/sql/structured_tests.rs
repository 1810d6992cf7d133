//! Tests for the structured SQL config.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use super::mock::MockConnector;
use super::{SqlOptions, SqliteConnector, StructuredSqlConfig};
use crate::config::{ConfigError, StructuredConfig};
use crate::element::Value;
use crate::test_support::init_tracing;
use crate::time::mock::MockClock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Settings {
    name: String,
    port: u16,
    ratio: f64,
    enabled: bool,
    hosts: Vec<String>,
    limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Limits {
    burst: u32,
    label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "svc".to_string(),
            port: 8080,
            ratio: 0.5,
            enabled: true,
            hosts: vec!["a".to_string()],
            limits: Limits {
                burst: 10,
                label: "std".to_string(),
            },
        }
    }
}

fn options() -> SqlOptions {
    SqlOptions::new("app", "cfg").with_cache_length(Duration::from_secs(10))
}

fn config(
    connector: &MockConnector,
    clock: &MockClock,
) -> StructuredSqlConfig<Settings, MockConnector> {
    StructuredSqlConfig::new(connector.clone(), options(), Settings::default())
        .unwrap()
        .with_clock(clock.clone())
}

mod loading {
    use super::*;

    #[test]
    fn empty_table_keeps_defaults() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));

        assert_eq!(config.get().unwrap(), Settings::default());
        assert_eq!(connector.write_count(), 0);
    }

    #[test]
    fn rows_are_coerced_to_field_types() {
        init_tracing();
        let connector = MockConnector::new();
        connector.insert("name", Some("123"));
        connector.insert("port", Some("9090"));
        connector.insert("ratio", Some("2"));
        connector.insert("enabled", Some("false"));
        connector.insert("limits.label", Some("true"));
        let config = config(&connector, &MockClock::new(0));

        let value = config.get().unwrap();

        assert_eq!(value.name, "123");
        assert_eq!(value.port, 9090);
        assert!((value.ratio - 2.0).abs() < f64::EPSILON);
        assert!(!value.enabled);
        assert_eq!(value.limits.label, "true");
    }

    #[test]
    fn array_rows_are_rebuilt_in_index_order() {
        let connector = MockConnector::new();
        for i in (0..12).rev() {
            connector.insert(&format!("hosts[{i}]"), Some(&format!("h{i}")));
        }
        let config = config(&connector, &MockClock::new(0));

        let hosts = config.get().unwrap().hosts;

        assert_eq!(hosts.len(), 12);
        assert_eq!(hosts[2], "h2");
        assert_eq!(hosts[10], "h10");
    }

    #[test]
    fn malformed_row_paths_are_skipped() {
        init_tracing();
        let connector = MockConnector::new();
        connector.insert("port", Some("1"));
        connector.insert("hosts[x]", Some("bad"));
        let config = config(&connector, &MockClock::new(0));

        assert_eq!(config.get().unwrap().port, 1);
    }

    #[test]
    fn mistyped_row_is_a_load_error() {
        let connector = MockConnector::new();
        connector.insert("port", Some("not-a-port"));
        let config = config(&connector, &MockClock::new(0));

        assert!(matches!(config.get(), Err(ConfigError::Load { .. })));
        assert!(!config.is_loaded());
    }

    #[test]
    fn query_failure_is_a_load_error() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.connect().unwrap();
        connector.fail_statements(true);

        assert!(matches!(config.load(false), Err(ConfigError::Load { .. })));
    }

    #[test]
    fn load_with_save_materializes_defaults() {
        let connector = MockConnector::new();
        connector.insert("port", Some("9090"));
        let config = config(&connector, &MockClock::new(0));

        config.load(true).unwrap();

        assert_eq!(connector.value("port").as_deref(), Some("9090"));
        assert_eq!(connector.value("name").as_deref(), Some("svc"));
        assert_eq!(connector.value("ratio").as_deref(), Some("0.5"));
        assert_eq!(connector.value("hosts[0]").as_deref(), Some("a"));
        assert_eq!(connector.value("limits.burst").as_deref(), Some("10"));
        // every leaf but the one already stored
        assert_eq!(connector.write_count(), 6);
    }
}

mod stored_strings {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        hosts: Vec<String>,
        nickname: Option<String>,
        labels: HashMap<String, String>,
        ports: Vec<u16>,
    }

    impl Default for Profile {
        fn default() -> Self {
            Self {
                hosts: vec!["a".to_string()],
                nickname: None,
                labels: HashMap::new(),
                ports: Vec::new(),
            }
        }
    }

    fn profile(connector: &MockConnector) -> StructuredSqlConfig<Profile, MockConnector> {
        StructuredSqlConfig::new(connector.clone(), options(), Profile::default()).unwrap()
    }

    #[test]
    fn numeric_text_in_a_new_array_slot_stays_a_string() {
        let connector = MockConnector::new();
        connector.insert("hosts[0]", Some("a"));
        connector.insert("hosts[1]", Some("8080"));
        connector.insert("hosts[2]", Some("true"));

        let hosts = profile(&connector).get().unwrap().hosts;

        assert_eq!(hosts, ["a", "8080", "true"]);
    }

    #[test]
    fn text_fills_an_option_that_defaults_to_none() {
        let connector = MockConnector::new();
        connector.insert("nickname", Some("42"));

        assert_eq!(
            profile(&connector).get().unwrap().nickname.as_deref(),
            Some("42")
        );
    }

    #[test]
    fn stored_null_reads_as_none() {
        let connector = MockConnector::new();
        connector.insert("nickname", Some("null"));

        assert_eq!(profile(&connector).get().unwrap().nickname, None);
    }

    #[test]
    fn map_entries_keep_look_alike_text() {
        let connector = MockConnector::new();
        connector.insert("labels.tier", Some("1"));
        connector.insert("labels.canary", Some("false"));
        connector.insert("labels.ratio", Some("0.5"));

        let labels = profile(&connector).get().unwrap().labels;

        assert_eq!(labels["tier"], "1");
        assert_eq!(labels["canary"], "false");
        assert_eq!(labels["ratio"], "0.5");
    }

    #[test]
    fn numbers_past_the_default_length_are_parsed() {
        let connector = MockConnector::new();
        connector.insert("ports[0]", Some("80"));
        connector.insert("ports[1]", Some("443"));

        assert_eq!(profile(&connector).get().unwrap().ports, [80, 443]);
    }

    #[test]
    fn writer_and_fresh_reader_agree() {
        let connector = MockConnector::new();
        let written = Profile {
            hosts: vec!["a".to_string(), "10".to_string(), "true".to_string()],
            nickname: Some("7".to_string()),
            labels: HashMap::from([
                ("tier".to_string(), "1".to_string()),
                ("on".to_string(), "false".to_string()),
            ]),
            ports: vec![80, 443],
        };
        let writer = profile(&connector);
        writer.set(written.clone()).unwrap();
        writer.save().unwrap();

        let reader = profile(&connector);

        assert_eq!(reader.get().unwrap(), written);
    }

    #[test]
    fn writer_and_fresh_reader_agree_on_sqlite() {
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("profile.db");
        let options = SqlOptions::new(database.to_string_lossy(), "profile");
        let written = Profile {
            hosts: vec!["a".to_string(), "10".to_string()],
            nickname: Some("1.5".to_string()),
            labels: HashMap::from([("retries".to_string(), "3".to_string())]),
            ports: vec![8080],
        };

        let writer =
            StructuredSqlConfig::new(SqliteConnector, options.clone(), Profile::default()).unwrap();
        writer.set(written.clone()).unwrap();
        writer.save().unwrap();
        writer.close().unwrap();

        let reader = StructuredSqlConfig::new(SqliteConnector, options, Profile::default()).unwrap();

        assert_eq!(reader.get().unwrap(), written);
    }
}

mod saving {
    use super::*;

    #[test]
    fn second_save_writes_nothing() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.load(false).unwrap();

        config.save().unwrap();
        let first = connector.write_count();
        config.save().unwrap();

        assert_eq!(first, 7);
        assert_eq!(connector.write_count(), first);
    }

    #[test]
    fn only_changed_leaves_are_written() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.load(true).unwrap();
        let before = connector.write_count();

        config.set_path("limits.burst", Value::from(20)).unwrap();
        config.save().unwrap();

        assert_eq!(connector.write_count(), before + 1);
        assert_eq!(connector.value("limits.burst").as_deref(), Some("20"));
    }

    #[test]
    fn remote_rows_are_never_deleted() {
        let connector = MockConnector::new();
        connector.insert("legacy.flag", Some("on"));
        connector.insert("legacy.hosts[3]", Some("stale"));
        let config = config(&connector, &MockClock::new(0));
        config.load(false).unwrap();

        config
            .set(Settings {
                hosts: Vec::new(),
                ..Settings::default()
            })
            .unwrap();
        config.save().unwrap();

        assert_eq!(connector.value("legacy.flag").as_deref(), Some("on"));
        assert_eq!(connector.value("legacy.hosts[3]").as_deref(), Some("stale"));
    }

    #[test]
    fn save_without_load_writes_current_value() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));

        config.save().unwrap();

        assert_eq!(connector.value("name").as_deref(), Some("svc"));
    }

    #[test]
    fn overlong_value_fails_before_any_write() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.load(false).unwrap();

        config
            .set_path("limits.label", Value::from("x".repeat(4097)))
            .unwrap();
        let err = config.save().unwrap_err();

        assert!(matches!(err, ConfigError::Save { .. }));
        assert!(err.to_string().contains("limits.label"));
        assert_eq!(connector.write_count(), 0);
    }

    #[test]
    fn value_at_column_capacity_is_written() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.load(false).unwrap();

        config
            .set_path("limits.label", Value::from("é".repeat(4096)))
            .unwrap();
        config.save().unwrap();

        assert_eq!(
            connector.value("limits.label").map(|v| v.chars().count()),
            Some(4096)
        );
    }

    #[test]
    fn statement_failure_is_a_save_error() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.load(false).unwrap();
        connector.fail_statements(true);

        assert!(matches!(config.save(), Err(ConfigError::Save { .. })));
    }
}

mod caching {
    use super::*;

    #[test]
    fn load_stays_fresh_for_cache_length() {
        let connector = MockConnector::new();
        let clock = MockClock::new(100);
        let config = config(&connector, &clock);

        config.get().unwrap();
        assert!(config.is_loaded());

        clock.advance(9);
        assert!(config.is_loaded());

        clock.advance(1);
        assert!(!config.is_loaded());
    }

    #[test]
    fn get_within_ttl_does_not_requery() {
        let connector = MockConnector::new();
        let clock = MockClock::new(0);
        let config = config(&connector, &clock);
        config.get().unwrap();

        connector.insert("port", Some("1"));
        clock.advance(5);

        assert_eq!(config.get().unwrap().port, 8080);
    }

    #[test]
    fn get_after_expiry_reloads() {
        let connector = MockConnector::new();
        let clock = MockClock::new(0);
        let config = config(&connector, &clock);
        config.get().unwrap();

        connector.insert("port", Some("1"));
        clock.advance(10);

        assert_eq!(config.get().unwrap().port, 1);
        assert!(config.is_loaded());
    }

    #[test]
    fn get_cached_never_loads() {
        let connector = MockConnector::new();
        let clock = MockClock::new(0);
        let config = config(&connector, &clock);

        assert!(matches!(config.get_cached(), Err(ConfigError::NotLoaded)));

        config.get().unwrap();
        connector.insert("port", Some("1"));
        clock.advance(60);

        assert_eq!(config.get_cached().unwrap().port, 8080);
        assert_eq!(connector.connect_count(), 1);
    }
}

mod reconnecting {
    use super::*;

    #[test]
    fn six_failures_trip_the_bound() {
        init_tracing();
        let connector = MockConnector::new();
        connector.fail_connects(100);
        let config = config(&connector, &MockClock::new(0));

        for _ in 0..5 {
            assert!(matches!(config.load(false), Err(ConfigError::Load { .. })));
        }
        let err = config.load(false).unwrap_err();

        assert!(matches!(err, ConfigError::MaxReconnects { attempts: 6 }));
        assert!(err.is_fatal());
        assert_eq!(config.reconnect_attempts(), 6);
    }

    #[test]
    fn connect_resets_the_counter() {
        let connector = MockConnector::new();
        connector.fail_connects(6);
        let config = config(&connector, &MockClock::new(0));
        for _ in 0..6 {
            assert!(config.get().is_err());
        }

        // one scripted failure left for the explicit connect
        assert!(config.connect().is_err());
        config.connect().unwrap();

        assert_eq!(config.reconnect_attempts(), 0);
        assert!(config.is_connected());
        config.get().unwrap();
    }

    #[test]
    fn lost_connection_is_reestablished() {
        let connector = MockConnector::new();
        let clock = MockClock::new(0);
        let config = config(&connector, &clock);
        config.get().unwrap();

        connector.drop_connections();
        clock.advance(10);
        config.get().unwrap();

        assert_eq!(connector.connect_count(), 2);
        assert_eq!(config.reconnect_attempts(), 0);
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn close_disconnects_and_is_single_shot() {
        let connector = MockConnector::new();
        let config = config(&connector, &MockClock::new(0));
        config.get().unwrap();

        config.close().unwrap();

        assert!(config.is_closed());
        assert!(!config.is_connected());
        assert!(!config.is_loaded());
        assert!(matches!(config.close(), Err(ConfigError::Closed)));
        assert!(matches!(config.get(), Err(ConfigError::Closed)));
        assert!(matches!(config.save(), Err(ConfigError::Closed)));
        assert!(matches!(config.connect(), Err(ConfigError::Closed)));
    }

    #[test]
    fn invalid_table_name_is_rejected() {
        let err = StructuredSqlConfig::new(
            MockConnector::new(),
            SqlOptions::new("app", "cfg; DROP TABLE cfg"),
            Settings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTableName { .. }));
    }

    #[test]
    fn path_access_goes_through_the_cache() {
        let connector = MockConnector::new();
        connector.insert("hosts[0]", Some("primary"));
        let config = config(&connector, &MockClock::new(0));

        assert_eq!(
            config.get_path("hosts[0]").unwrap(),
            Some(Value::from("primary"))
        );
        config.set_path("hosts[1]", Value::from("backup")).unwrap();
        config.save().unwrap();

        assert_eq!(connector.value("hosts[1]").as_deref(), Some("backup"));
    }
}

mod sqlite {
    use super::*;

    #[test]
    fn round_trip_through_a_database_file() {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("config.db");
        let options = SqlOptions::new(database.to_string_lossy(), "settings");

        let writer =
            StructuredSqlConfig::new(SqliteConnector, options.clone(), Settings::default())
                .unwrap();
        writer.load(true).unwrap();
        writer.set_path("limits.label", Value::from("gold")).unwrap();
        writer.set_path("hosts[1]", Value::from("b")).unwrap();
        writer.save().unwrap();
        writer.close().unwrap();

        let blank = Settings {
            name: String::new(),
            port: 0,
            ratio: 0.0,
            enabled: false,
            hosts: Vec::new(),
            limits: Limits {
                burst: 0,
                label: String::new(),
            },
        };
        let reader = StructuredSqlConfig::new(SqliteConnector, options, blank).unwrap();
        let value = reader.get().unwrap();

        assert_eq!(value.limits.label, "gold");
        assert_eq!(value.hosts, ["a", "b"]);
        assert_eq!(value.port, 8080);
        assert!((value.ratio - 0.5).abs() < f64::EPSILON);
        assert!(value.enabled);
    }
}
