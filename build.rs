use std::env;
use std::fs;
use std::path::Path;

/// Variables que `AppConfig::from_env` lee con `option_env!`
const TRACKED_VARS: &[&str] = &[
    "ACACHAT_ENVIRONMENT",
    "ACACHAT_API_URL_DEVELOPMENT",
    "ACACHAT_API_URL_PRODUCTION",
    "ACACHAT_STORAGE_KEY",
    "ACACHAT_LOGIN_ROUTE",
    "ACACHAT_AUTH_AREA_PREFIX",
    "ACACHAT_DEFAULT_PRIMARY_COLOR",
    "ACACHAT_ENABLE_LOGGING",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.env");

    for var in TRACKED_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    let env_file = Path::new(".env");
    let contents = match fs::read_to_string(env_file) {
        Ok(contents) => contents,
        // Sin .env se usan los valores por defecto de config.rs
        Err(_) => return,
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');

        // Solo las variables de la app, y el entorno real tiene prioridad
        if TRACKED_VARS.contains(&key) && env::var(key).is_err() {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}
