use std::time::Duration;

use arikitari::config::{Config, DEFAULT_IDLE_TIMEOUT_SECS};

// Environment variables are process-wide, so every env-driven case lives in
// this one test.
#[test]
fn test_config_from_env() {
    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("IDLE_TIMEOUT");
        std::env::remove_var("WORKERS");
        std::env::remove_var("SERVER_NAME");
    }
    let cfg = Config::load();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.idle_timeout_secs, DEFAULT_IDLE_TIMEOUT_SECS);
    assert!(cfg.workers >= 1);
    assert!(cfg.server_name.starts_with("arikitari/"));

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
        std::env::set_var("IDLE_TIMEOUT", "5");
        std::env::set_var("WORKERS", "3");
        std::env::set_var("SERVER_NAME", "edge");
    }
    let cfg = Config::load();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.idle_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.workers, 3);
    assert_eq!(cfg.server_name, "edge");

    unsafe {
        std::env::set_var("WORKERS", "many");
    }
    let cfg = Config::load();
    assert!(cfg.workers >= 1);

    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("IDLE_TIMEOUT");
        std::env::remove_var("WORKERS");
        std::env::remove_var("SERVER_NAME");
    }
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr, cfg2.listen_addr);
    assert_eq!(cfg1.idle_timeout_secs, cfg2.idle_timeout_secs);
}

#[test]
fn test_config_from_yaml() {
    let yaml = "listen_addr: \"0.0.0.0:5000\"\nidle_timeout_secs: 10\nworkers: 2\nserver_name: yaml-server\n";
    let cfg = Config::from_yaml_str(yaml).unwrap();

    assert!(cfg.listen_addr.starts_with("0.0.0.0"));
    assert!(cfg.listen_addr.contains("5000"));
    assert_eq!(cfg.idle_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.workers, 2);
    assert_eq!(cfg.server_name, "yaml-server");
}

#[test]
fn test_config_yaml_missing_fields_use_defaults() {
    let cfg = Config::from_yaml_str("listen_addr: \"127.0.0.1:8000\"\n").unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8000");
    assert_eq!(cfg.idle_timeout_secs, DEFAULT_IDLE_TIMEOUT_SECS);
    assert!(cfg.workers >= 1);
}

#[test]
fn test_config_yaml_rejects_bad_types() {
    assert!(Config::from_yaml_str("idle_timeout_secs: soon\n").is_err());
}

#[test]
fn test_config_from_missing_file() {
    assert!(Config::from_file("/definitely/not/here.yaml").is_err());
}
