//! Table-driven tests for configuration loading and validation.

use std::io::Write;
use std::time::Duration;

use lucio::config::{load_config, load_config_from_str};
use lucio::pipeline::PipelineConfig;
use lucio::ConfigError;

struct ConfigTestCase {
    name: &'static str,
    config_json: &'static str,
    should_succeed: bool,
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{ "version": "1.0" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "output_directory": "/tmp/lucio-out",
            "worker_count": 4,
            "models": {
                "planning": "gemini-2.0-flash",
                "perception": "gemini-2.0-pro",
                "web": "gemini-2.0-flash",
                "content": "gemini-2.0-flash"
            },
            "llm": {
                "endpoint": "https://llm.internal/v1beta",
                "api_key_env": "LUCIO_TEST_KEY",
                "max_retries": 2,
                "request_timeout_secs": 30
            },
            "capture": { "enabled": false, "interval_ms": 500, "command": ["grim", "-"] },
            "scraper": { "timeout_secs": 5, "user_agent": "lucio-test" },
            "budgets": {
                "web_prompt_chars": 1000,
                "content_prompt_chars": 800,
                "extended_text_chars": 1500,
                "trace_preview_chars": 80
            },
            "timeouts": { "model_secs": 90, "fetch_secs": null, "render_secs": 10 }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "missing_version",
        config_json: r#"{ "output_directory": "/out" }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "unknown_version",
        config_json: r#"{ "version": "2.0" }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "unknown_top_level_key",
        config_json: r#"{ "version": "1.0", "input_directory": "/in" }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "zero_workers",
        config_json: r#"{ "version": "1.0", "worker_count": 0 }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "empty_model_name",
        config_json: r#"{ "version": "1.0", "models": { "web": "" } }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "too_many_retries",
        config_json: r#"{ "version": "1.0", "llm": { "max_retries": 50 } }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "capture_interval_too_small",
        config_json: r#"{ "version": "1.0", "capture": { "interval_ms": 10 } }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "zero_budget",
        config_json: r#"{ "version": "1.0", "budgets": { "web_prompt_chars": 0 } }"#,
        should_succeed: false,
        expected_error: Some("does not match schema"),
    },
    ConfigTestCase {
        name: "not_json",
        config_json: "version = 1.0",
        should_succeed: false,
        expected_error: Some("not valid JSON"),
    },
];

#[test]
fn test_json_config_cases() {
    for case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);

        if case.should_succeed {
            assert!(
                result.is_ok(),
                "[{}] expected success, got {:?}",
                case.name,
                result.err()
            );
        } else {
            let err = match result {
                Ok(_) => panic!("[{}] expected failure", case.name),
                Err(e) => e.to_string(),
            };
            if let Some(expected) = case.expected_error {
                assert!(
                    err.contains(expected),
                    "[{}] expected error containing '{}', got '{}'",
                    case.name,
                    expected,
                    err
                );
            }
        }
    }
}

#[test]
fn test_full_config_flows_into_pipeline_config() {
    let config = load_config_from_str(JSON_CONFIG_TESTS[1].config_json).unwrap();
    let pipeline = PipelineConfig::from_config(&config);

    assert_eq!(
        pipeline.output_directory,
        std::path::PathBuf::from("/tmp/lucio-out")
    );
    assert_eq!(pipeline.budgets.web_prompt_chars, 1000);
    assert_eq!(pipeline.budgets.trace_preview_chars, 80);
    assert_eq!(pipeline.model_timeout, Some(Duration::from_secs(90)));
    assert_eq!(pipeline.fetch_timeout, None);
    assert_eq!(pipeline.render_timeout, Some(Duration::from_secs(10)));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "version": "1.0", "worker_count": 3 }}"#).unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.worker_count, 3);
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = load_config(dir.path().join("absent.json"));

    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}
