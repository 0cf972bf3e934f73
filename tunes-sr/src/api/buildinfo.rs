//! Build identification endpoint

use axum::Json;
use serde::Serialize;

/// Values captured by build.rs at compile time
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub module: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            module: "tunes-sr",
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            build_profile: env!("BUILD_PROFILE"),
        }
    }
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_values_are_captured() {
        let info = BuildInfo::current();
        assert!(!info.git_hash.is_empty());
        assert!(!info.build_profile.is_empty());
        // RFC 3339 at second precision, UTC
        assert!(info.build_timestamp.ends_with('Z'));
        assert_eq!(info.build_timestamp.len(), "2026-01-01T00:00:00Z".len());
    }
}
