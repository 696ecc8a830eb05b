use guardias::config::Config;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

const KEYS: [&str; 7] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CLIENT_BASE_URL",
    "MIRROR_MAX_WEEK_GAP",
];

/// Runs `f` with the configuration variables cleared, restoring them after.
fn with_clean_env<F: FnOnce()>(f: F) {
    let original: Vec<_> = KEYS.iter().map(|k| (*k, env::var(k).ok())).collect();
    for key in KEYS {
        unsafe { env::remove_var(key) };
    }

    f();

    for (key, value) in original {
        unsafe {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:./guardias.db");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.client_base_url, "http://localhost:3000");
        assert_eq!(config.mirror_max_week_gap, 1);
        assert!(!config.is_production());
    });
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "sqlite:./test.db");
            env::set_var("JWT_SECRET", "test-secret");
            env::set_var("HOST", "0.0.0.0");
            env::set_var("PORT", "3000");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("CLIENT_BASE_URL", "https://guardias.example.org");
            env::set_var("MIRROR_MAX_WEEK_GAP", "2");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:./test.db");
        assert_eq!(config.jwt_secret, "test-secret");
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert!(config.is_production());
        assert_eq!(config.client_base_url, "https://guardias.example.org");
        assert_eq!(config.mirror_max_week_gap, 2);
    });
}

#[test]
#[serial]
fn test_config_rejects_malformed_numbers() {
    with_clean_env(|| {
        unsafe { env::set_var("PORT", "not-a-port") };
        let error = Config::from_env_only().unwrap_err();
        assert!(error.to_string().contains("PORT"));

        unsafe {
            env::remove_var("PORT");
            env::set_var("MIRROR_MAX_WEEK_GAP", "one");
        }
        let error = Config::from_env_only().unwrap_err();
        assert!(error.to_string().contains("MIRROR_MAX_WEEK_GAP"));
    });
}
