//! Configuration defaults and JSON deserialization tests.

use memsim_core::config::Config;
use pretty_assertions::assert_eq;

#[test]
fn defaults_match_baseline_hardware() {
    let config = Config::default();
    assert_eq!(config.memory.main_size, 1 << 20);
    assert_eq!(config.memory.lite_size, 1 << 20);
    assert_eq!(config.system.non_cacheable_base, 0);
    assert_eq!(config.system.non_cacheable_limit, 0);
    assert!(config.cache.l1_i.enabled);
    assert!(config.cache.l1_d.enabled);
    assert_eq!(config.cache.l1_d.size_bytes, 1024);
    assert_eq!(config.cache.l1_d.line_bytes, 64);
    assert_eq!(config.cache.l1_d.ways, 2);
}

#[test]
fn json_overrides_selected_fields() {
    let json = r#"{
        "system": { "non_cacheable_base": 4096, "non_cacheable_limit": 8192 },
        "cache": {
            "l1_d": { "size_bytes": 2048, "ways": 4 }
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.system.non_cacheable_base, 4096);
    assert_eq!(config.system.non_cacheable_limit, 8192);
    assert_eq!(config.cache.l1_d.size_bytes, 2048);
    assert_eq!(config.cache.l1_d.ways, 4);
    // Untouched fields keep their defaults.
    assert_eq!(config.cache.l1_d.line_bytes, 64);
    assert_eq!(config.cache.l1_i.size_bytes, 1024);
    assert_eq!(config.memory.main_size, 1 << 20);
}

#[test]
fn empty_json_is_default() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.cache.l1_d.size_bytes, Config::default().cache.l1_d.size_bytes);
}

#[test]
fn cache_can_be_disabled() {
    let json = r#"{ "cache": { "l1_d": { "enabled": false } } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert!(!config.cache.l1_d.enabled);
    assert!(config.cache.l1_i.enabled);
}
