//! Build identification stamped in by `build.rs`

use serde::Serialize;
use std::fmt;

/// Version, source revision and build time of the running binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// `git describe` output, `-dirty` suffixed for uncommitted changes
    pub git_rev: &'static str,
    /// UTC, second precision
    pub built_at: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_rev: env!("WIZZ_GIT_REV"),
            built_at: env!("WIZZ_BUILD_TIME"),
            profile: env!("WIZZ_BUILD_PROFILE"),
        }
    }

    pub fn is_release(&self) -> bool {
        self.profile == "release"
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} ({}", self.version, self.git_rev)?;
        if !self.is_release() {
            write!(f, ", {}", self.profile)?;
        }
        write!(f, ") built {}", self.built_at)
    }
}
