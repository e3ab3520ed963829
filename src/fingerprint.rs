//! Browser fingerprint headers for outbound page fetches.
//!
//! Embed hosts commonly reject requests that lack a recognizable client
//! signature, so every fetch carries a realistic browser profile unless the
//! caller overrides individual headers.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// User-Agent sent when no profile is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8";

const CHROME_VERSIONS: &[&str] = &["120.0.0.0", "124.0.0.0", "128.0.0.0", "131.0.0.0"];
const FIREFOX_VERSIONS: &[&str] = &["121.0", "125.0", "128.0", "133.0"];

/// Browser profile with realistic fingerprint headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Copy)]
enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    fn random() -> Self {
        let mut rng = rand::thread_rng();
        // Realistic distribution: Windows 65%, macOS 20%, Linux 15%
        let roll: f32 = rng.gen();
        if roll < 0.65 {
            Platform::Windows
        } else if roll < 0.85 {
            Platform::MacOS
        } else {
            Platform::Linux
        }
    }

    fn os_string(self) -> &'static str {
        match self {
            Platform::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
            Platform::Windows => "Windows NT 10.0; Win64; x64",
            Platform::Linux => "X11; Linux x86_64",
        }
    }
}

impl BrowserProfile {
    /// Profile with an explicit User-Agent and default Accept headers.
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }

    /// Convert profile to reqwest `HeaderMap`.
    ///
    /// Values that are not valid header text are skipped.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for (name, value) in [
            (USER_AGENT, &self.user_agent),
            (ACCEPT, &self.accept),
            (ACCEPT_LANGUAGE, &self.accept_language),
        ] {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(_) => tracing::warn!("Skipping invalid {} header value", name.as_str()),
            }
        }

        headers
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }
}

/// Generate a realistic Chrome browser profile
#[must_use]
pub fn chrome_profile() -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let version = CHROME_VERSIONS.choose(&mut rng).unwrap_or(&"120.0.0.0");

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36",
            Platform::random().os_string()
        ),
        accept_language: random_accept_language(),
        ..BrowserProfile::default()
    }
}

/// Generate a realistic Firefox browser profile
#[must_use]
pub fn firefox_profile() -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let version = FIREFOX_VERSIONS.choose(&mut rng).unwrap_or(&"128.0");

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}; rv:{version}) Gecko/20100101 Firefox/{version}",
            Platform::random().os_string()
        ),
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        accept_language: random_accept_language(),
    }
}

/// Generate a random browser profile (weighted by market share)
#[must_use]
pub fn random_profile() -> BrowserProfile {
    let roll: f32 = rand::thread_rng().gen();
    if roll < 0.8 {
        chrome_profile()
    } else {
        firefox_profile()
    }
}

fn random_accept_language() -> String {
    let mut rng = rand::thread_rng();
    let languages = [
        "en-US,en;q=0.9",
        "en-GB,en;q=0.9",
        "en-US,en;q=0.9,de;q=0.8",
        "en-US,en;q=0.9,fr;q=0.8",
        "en-US,en;q=0.9,es;q=0.8",
    ];
    languages
        .choose(&mut rng)
        .unwrap_or(&"en-US,en;q=0.9")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_chrome_like() {
        let profile = BrowserProfile::default();
        assert_eq!(profile.user_agent, DEFAULT_USER_AGENT);
        assert!(profile.user_agent.contains("Chrome"));
    }

    #[test]
    fn test_chrome_profile() {
        let profile = chrome_profile();
        assert!(profile.user_agent.contains("Chrome/"));
        assert!(profile.user_agent.starts_with("Mozilla/5.0 ("));
    }

    #[test]
    fn test_firefox_profile() {
        let profile = firefox_profile();
        assert!(profile.user_agent.contains("Firefox/"));
        assert!(profile.user_agent.contains("Gecko/20100101"));
    }

    #[test]
    fn test_profile_to_headers_includes_required() {
        let headers = random_profile().to_headers();
        assert!(headers.contains_key("user-agent"));
        assert!(headers.contains_key("accept"));
        assert!(headers.contains_key("accept-language"));
    }

    #[test]
    fn test_invalid_user_agent_is_skipped() {
        let headers = BrowserProfile::with_user_agent("bad\nagent").to_headers();
        assert!(!headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
    }
}
