use content_gate::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const VARS: [&str; 6] = [
    "APP_ENV",
    "NEXTAUTH_SECRET",
    "NEXT_PUBLIC_API_URL",
    "NEXTAUTH_URL",
    "BIND_ADDR",
    "HEALTH_RETRY_DELAY_MS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with a clean slate for the gate's variables and restores them afterwards.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("NEXT_PUBLIC_API_URL", "https://api.example.com");
                env::set_var("NEXTAUTH_URL", "https://studio.example.com");
            }
            // NEXTAUTH_SECRET is missing.
            AppConfig::load()
        })
        .is_err()
    });

    assert!(
        result,
        "Production config loading should panic without NEXTAUTH_SECRET"
    );
}

#[test]
#[serial]
fn test_app_config_production_reads_everything() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("NEXTAUTH_SECRET", "prod-secret");
            env::set_var("NEXT_PUBLIC_API_URL", "https://api.example.com/");
            env::set_var("NEXTAUTH_URL", "https://studio.example.com");
            env::set_var("HEALTH_RETRY_DELAY_MS", "250");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.auth_secret, "prod-secret");
    assert_eq!(config.api_url, "https://api.example.com");
    assert_eq!(config.health_retry_delay, Duration::from_millis(250));
    assert!(config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    let defaults = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.auth_secret, defaults.auth_secret);
    assert_eq!(config.api_url, "http://localhost:8000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert!(!config.secure_cookies());
}
