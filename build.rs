use std::{env, fs, path::PathBuf};

fn main() {
    // 1) Place the board's linker memory layout where cortex-m-rt looks for it
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumbv8m") {
        install_memory_x("memory-pico2.x");
    } else if target.starts_with("thumbv6m") {
        install_memory_x("memory-pico1w.x");
    }

    // 2) Load optional env files (still supported for convenience)
    let _ = dotenvy::from_filename(".env");
    load_home_env(".pico.env");
    load_home_env(".env");

    // 3) Provide fallbacks so the clock can compile without .env
    let wifi_ssid = env_or_default("WIFI_SSID", "");
    let wifi_pass = env_or_default("WIFI_PASS", "");
    let utc_offset = env_or_default("UTC_OFFSET_MINUTES", "0");

    // Warn only if Wi-Fi was explicitly enabled but credentials are missing.
    if env::var_os("CARGO_FEATURE_WIFI").is_some() {
        if wifi_ssid.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_SSID is not set; using empty string"
            );
        }
        if wifi_pass.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_PASS is not set; using empty string"
            );
        }
    }
    if utc_offset.trim().parse::<i32>().is_err() {
        println!(
            "cargo:warning=UTC_OFFSET_MINUTES={utc_offset} is not a whole number of minutes; using 0"
        );
    }

    // 4) Expose as compile-time constants
    println!("cargo:rustc-env=WIFI_SSID={wifi_ssid}");
    println!("cargo:rustc-env=WIFI_PASS={wifi_pass}");
    println!("cargo:rustc-env=UTC_OFFSET_MINUTES={}", utc_offset.trim());

    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-env-changed=UTC_OFFSET_MINUTES");
    println!("cargo:rerun-if-changed=.env");
}

fn install_memory_x(source: &str) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo always sets OUT_DIR"));
    let memory_x = fs::read_to_string(source).unwrap_or_else(|e| panic!("Failed to read {source}: {e}"));
    fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed={source}");
}

fn load_home_env(file: &str) {
    let home = match env::var_os("USERPROFILE").or_else(|| env::var_os("HOME")) {
        Some(path) => PathBuf::from(path),
        None => return,
    };
    let _ = dotenvy::from_path(home.join(file));
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
