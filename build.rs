use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DOCKER_FACADE_DEFAULT_API_VERSION");

    // Optional: bake in a different default Engine API version, e.g. "1.43" or "v1.43".
    if let Ok(val) = std::env::var("DOCKER_FACADE_DEFAULT_API_VERSION") {
        let v = val.trim().trim_start_matches('v');
        let valid = v
            .split_once('.')
            .map(|(major, minor)| {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.bytes().all(|b| b.is_ascii_digit())
                    && minor.bytes().all(|b| b.is_ascii_digit())
            })
            .unwrap_or(false);
        if valid {
            println!("cargo:rustc-env=DOCKER_FACADE_API_VERSION={v}");
        } else {
            println!("cargo:warning=ignoring DOCKER_FACADE_DEFAULT_API_VERSION={val:?}");
        }
    }

    // Build date (UTC ISO-8601). Fallback to unix:<secs> if `date` is unavailable.
    let build_date = Command::new("date")
        .args(["-u", "+%Y-%m-%dT%H:%M:%SZ"])
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                Some(String::from_utf8_lossy(&o.stdout).trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| std::time::Duration::from_secs(0))
                .as_secs();
            format!("unix:{secs}")
        });
    println!("cargo:rustc-env=DOCKER_FACADE_BUILD_DATE={build_date}");

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=DOCKER_FACADE_BUILD_TARGET={target}");

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=DOCKER_FACADE_BUILD_PROFILE={profile}");
}
