//! Execution environment detection.
//!
//! The client runs either against the origin that serves it (the web case) or
//! inside a native wrapper that has its own HTTP bridge. A [`PlatformProbe`]
//! answers which one applies; the transport layer asks once per request.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`EnvProbe`].
pub const PLATFORM_ENV: &str = "GKCHAT_PLATFORM";

/// The platform the client believes it is running on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    /// Served from a web origin; requests are relative to it.
    #[default]
    Web,
    /// Embedded in a native wrapper on iOS.
    Ios,
    /// Embedded in a native wrapper on Android.
    Android,
}

impl Platform {
    /// Returns true for the wrapped native runtimes.
    pub fn is_native(&self) -> bool {
        !matches!(self, Platform::Web)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Web => write!(f, "web"),
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Parses a platform name.
    ///
    /// `native` is accepted as a generic native platform and maps to Android,
    /// which shares the bridge behavior with iOS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" | "browser" => Ok(Platform::Web),
            "ios" => Ok(Platform::Ios),
            "android" | "native" => Ok(Platform::Android),
            _ => Err(format!(
                "Invalid platform: {}. Valid options: web, ios, android, native",
                s
            )),
        }
    }
}

/// Answers which platform the client is running on.
pub trait PlatformProbe: Send + Sync {
    /// Returns the current platform.
    fn platform(&self) -> Platform;

    /// Returns true when running inside the native wrapper.
    fn is_native_platform(&self) -> bool {
        self.platform().is_native()
    }
}

/// Reads the platform from [`PLATFORM_ENV`] on every query.
///
/// Unset or unrecognized values mean [`Platform::Web`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvProbe;

impl PlatformProbe for EnvProbe {
    fn platform(&self) -> Platform {
        env::var(PLATFORM_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Always reports the same platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedProbe(pub Platform);

impl PlatformProbe for FixedProbe {
    fn platform(&self) -> Platform {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_platforms() {
        assert_eq!("web".parse::<Platform>(), Ok(Platform::Web));
        assert_eq!("Browser".parse::<Platform>(), Ok(Platform::Web));
        assert_eq!(" ios ".parse::<Platform>(), Ok(Platform::Ios));
        assert_eq!("ANDROID".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!("native".parse::<Platform>(), Ok(Platform::Android));
        assert!("desktop".parse::<Platform>().is_err());
    }

    #[test]
    fn only_web_is_not_native() {
        assert!(!Platform::Web.is_native());
        assert!(Platform::Ios.is_native());
        assert!(Platform::Android.is_native());
    }

    #[test]
    fn fixed_probe_reports_its_platform() {
        assert!(FixedProbe(Platform::Ios).is_native_platform());
        assert!(!FixedProbe(Platform::Web).is_native_platform());
        assert_eq!(FixedProbe::default().platform(), Platform::Web);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for platform in [Platform::Web, Platform::Ios, Platform::Android] {
            assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
        }
    }

    #[test]
    fn env_probe_reads_variable_each_query() {
        // Only this test touches GKCHAT_PLATFORM.
        let probe = EnvProbe;
        unsafe { env::remove_var(PLATFORM_ENV) };
        assert_eq!(probe.platform(), Platform::Web);
        assert!(!probe.is_native_platform());

        unsafe { env::set_var(PLATFORM_ENV, "ios") };
        assert_eq!(probe.platform(), Platform::Ios);
        assert!(probe.is_native_platform());

        unsafe { env::set_var(PLATFORM_ENV, "native") };
        assert!(probe.is_native_platform());

        unsafe { env::set_var(PLATFORM_ENV, "toaster") };
        assert_eq!(probe.platform(), Platform::Web);
        assert!(!probe.is_native_platform());

        unsafe { env::remove_var(PLATFORM_ENV) };
        assert!(!probe.is_native_platform());
    }
}
