/*!
 * Tests for configuration loading and validation
 */

use tempfile::TempDir;
use tlgate::app_config::{Config, LogLevel};

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.engine.max_retries, 3);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["provider"]["model"], "GalTransl-v4-4B-2601");
    assert_eq!(written["engine"]["failure_marker"], "[翻译失败] ");
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldKeepItsValues() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "provider": {"endpoint": "http://192.168.1.20:5000/v1", "model": "sakura-14b"},
            "engine": {"repeat_count": 6, "leakage_markers": ["历史翻译："]},
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.provider.endpoint, "http://192.168.1.20:5000/v1");
    assert_eq!(config.provider.model, "sakura-14b");
    assert_eq!(config.engine.repeat_count, 6);
    assert_eq!(config.engine.leakage_markers, vec!["历史翻译：".to_string()]);
    assert_eq!(config.engine.request_timeout_secs, 20);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_withInvalidJson_shouldFailWithPath() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let error = Config::load(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("broken.json"));
}

#[test]
fn test_validate_withEmptyModel_shouldFail() {
    let mut config = Config::default();
    config.provider.model = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_save_thenLoad_shouldPreserveEngineSettings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.engine.max_retries = 5;
    config.engine.default_params.temperature = 0.2;

    config.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();

    assert_eq!(loaded.engine.max_retries, 5);
    assert_eq!(loaded.engine.default_params, config.engine.default_params);
}
