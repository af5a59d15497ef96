//! Configuration/platform naming algebra.
//!
//! Descriptors spell the same semantic platform two ways (`AnyCPU` and
//! `Any CPU`). Everything that uses a `Configuration|Platform` pair as a map
//! key must go through these normalizers first; a missed normalization shows
//! up downstream as a spurious "no mapping found".

/// Canonical platform spelling. `Any CPU` collapses to `AnyCPU`.
pub fn normalize_platform(platform: &str) -> String {
    let platform = platform.trim();
    if platform.eq_ignore_ascii_case("any cpu") || platform.eq_ignore_ascii_case("anycpu") {
        return String::from("AnyCPU");
    }
    platform.to_string()
}

/// Canonical `Configuration|Platform` pair.
pub fn normalize_pair(pair: &str) -> String {
    match pair.split_once('|') {
        Some((configuration, platform)) => {
            to_config(configuration, &normalize_platform(platform))
        }
        None => pair.trim().to_string(),
    }
}

/// Join a configuration and a platform into the pair key.
pub fn to_config(configuration: &str, platform: &str) -> String {
    format!("{}|{}", configuration.trim(), platform)
}
