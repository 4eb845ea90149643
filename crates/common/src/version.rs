use std::fmt;

use serde::Serialize;

/// Build metadata baked in by the binary's build script.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub build_target: &'static str,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} build for {}, features: {}, built {} with {})",
            self.version,
            self.repo_version,
            self.build_profile,
            self.build_target,
            self.build_features,
            self.build_timestamp,
            self.rust_version
        )
    }
}

/// Expands in the calling crate so its own build script's values are used.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            repo_version: option_env!("REPO_VERSION").unwrap_or("unknown"),
            build_profile: option_env!("BUILD_PROFILE").unwrap_or("unknown"),
            build_features: option_env!("BUILD_FEATURES").unwrap_or("none"),
            build_timestamp: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
            build_target: option_env!("BUILD_TARGET").unwrap_or("unknown"),
        }
    };
}
