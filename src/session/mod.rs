//! Browser session state
//!
//! [`SessionState`] holds the cookie set, the device/browser fingerprint
//! fields merged into every request, and the login-validity flag. It is
//! seeded from a live [`BrowserSession`] and afterwards mutated only through
//! `ApiClient::update_session`; the request pipeline reads it, nothing else
//! writes it.

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;

/// Local-storage key holding the rotating request token
const MS_TOKEN_KEY: &str = "xmst";

/// Local-storage login marker set by the site after a successful login
const LOGIN_FLAG_KEY: &str = "HasUserLogin";

/// Cookie name carrying the login state
const LOGIN_COOKIE: &str = "LOGIN_STATUS";

/// Read access to the rendering context that owns the real session
///
/// Implemented by the embedding application on top of its browser engine.
/// The core uses it to detect login state and to seed [`SessionState`].
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Reads one value from the page's local storage
    async fn read_local_value(&self, key: &str) -> Option<String>;

    /// Returns the current cookie set as (name, value) pairs
    async fn current_cookies(&self) -> Vec<(String, String)>;

    /// Returns the browser's user agent string
    async fn user_agent(&self) -> String;
}

/// Session state shared with the request pipeline
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Cookie name → value
    pub cookies: HashMap<String, String>,

    /// Device/browser fingerprint fields merged into every request's params
    pub fingerprint: HashMap<String, String>,

    /// Browser user agent, sent as a header and fed to the signing oracle
    pub user_agent: String,

    /// Whether the session passed login detection at seed time
    pub login_valid: bool,
}

impl SessionState {
    /// Builds a session from explicit cookie pairs and a user agent
    pub fn new(cookies: Vec<(String, String)>, user_agent: String) -> Self {
        let cookies: HashMap<String, String> = cookies.into_iter().collect();
        let login_valid = cookies
            .get(LOGIN_COOKIE)
            .map(|v| v == "1")
            .unwrap_or(false);
        Self {
            cookies,
            fingerprint: default_fingerprint(),
            user_agent,
            login_valid,
        }
    }

    /// Seeds a session from a live browser: cookies, user agent, the
    /// local-storage request token, and the login flag
    pub async fn from_browser(browser: &dyn BrowserSession) -> Self {
        let mut state = Self::new(
            browser.current_cookies().await,
            browser.user_agent().await,
        );

        if let Some(token) = browser.read_local_value(MS_TOKEN_KEY).await {
            state.fingerprint.insert("msToken".to_string(), token);
        }
        state.login_valid = detect_login(browser).await;
        state
    }

    /// Renders the cookie map as a `Cookie` header value
    pub fn cookie_header(&self) -> String {
        let mut pairs: Vec<_> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }

    /// Atomically replaces the cookie set after an external login transition
    pub fn replace_cookies(&mut self, cookies: Vec<(String, String)>) {
        self.cookies = cookies.into_iter().collect();
        self.login_valid = self
            .cookies
            .get(LOGIN_COOKIE)
            .map(|v| v == "1")
            .unwrap_or(self.login_valid);
    }
}

/// Checks whether the browser session is logged in
///
/// Either the local-storage flag or the login cookie counts; the site sets
/// whichever path the login flow went through.
pub async fn detect_login(browser: &dyn BrowserSession) -> bool {
    if let Some(flag) = browser.read_local_value(LOGIN_FLAG_KEY).await {
        if flag == "1" {
            return true;
        }
    }

    browser
        .current_cookies()
        .await
        .iter()
        .any(|(name, value)| name == LOGIN_COOKIE && value == "1")
}

/// Device and browser constants sent with every request
///
/// These mirror a desktop Chrome session; the remote service cross-checks
/// them against the signed token, so they must stay consistent with what the
/// signing oracle's rendering context reports.
pub fn default_fingerprint() -> HashMap<String, String> {
    let pairs = [
        ("device_platform", "webapp"),
        ("platform", "PC"),
        ("pc_client_type", "1"),
        ("aid", "6383"),
        ("channel", "channel_pc_web"),
        ("version_code", "190600"),
        ("version_name", "19.6.0"),
        ("update_version_code", "170400"),
        ("cookie_enabled", "true"),
        ("browser_language", "zh-CN"),
        ("browser_platform", "MacIntel"),
        ("browser_name", "Chrome"),
        ("browser_version", "125.0.0.0"),
        ("browser_online", "true"),
        ("engine_name", "Blink"),
        ("engine_version", "109.0"),
        ("os_name", "Mac OS"),
        ("os_version", "10.15.7"),
        ("cpu_core_num", "8"),
        ("device_memory", "8"),
        ("screen_width", "2560"),
        ("screen_height", "1440"),
        ("effective_type", "4g"),
        ("round_trip_time", "50"),
    ];

    let mut fingerprint: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    fingerprint.insert("webid".to_string(), generate_web_id());
    fingerprint
}

/// Generates a random 19-digit web id in the range the site hands out
pub fn generate_web_id() -> String {
    let mut rng = rand::thread_rng();
    let id: u64 = rng.gen_range(7_000_000_000_000_000_000..7_999_999_999_999_999_999);
    id.to_string()
}
