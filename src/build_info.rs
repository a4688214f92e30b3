//! Build metadata
//!
//! `build.rs` stamps a build counter and the compile time into the
//! environment. The status tool and the startup banner read them back
//! through [`BuildInfo`].

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version, build counter, and compile time of the running binary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamps(
            option_env!("NUTRICALC_BUILD_NUMBER"),
            option_env!("NUTRICALC_BUILD_TIMESTAMP"),
        )
    }

    /// Missing or garbled stamps become build 0 at an unknown time
    fn from_stamps(number: Option<&'static str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.unwrap_or("unknown"),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "nutricalc {} (build {}, {})",
            self.version, self.build_number, self.build_timestamp
        )
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    eprintln!("{} - products, dishes, calorie totals", BuildInfo::current().label());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stamps() {
        let info = BuildInfo::from_stamps(Some("42"), Some("2026-01-02T03:04:05Z"));
        assert_eq!(info.build_number, 42);
        assert_eq!(info.build_timestamp, "2026-01-02T03:04:05Z");
        assert_eq!(info.version, VERSION);
    }

    #[test]
    fn test_from_stamps_fallbacks() {
        let info = BuildInfo::from_stamps(None, None);
        assert_eq!(info.build_number, 0);
        assert_eq!(info.build_timestamp, "unknown");
        assert_eq!(BuildInfo::from_stamps(Some("4a"), None).build_number, 0);
    }

    #[test]
    fn test_label() {
        let info = BuildInfo::from_stamps(Some("7"), Some("then"));
        assert_eq!(info.label(), format!("nutricalc {} (build 7, then)", VERSION));
    }
}
