// Realtime-update preference: get/set/clear capability injected into the presenter.

use crate::config::CookieConfig;

pub trait PreferenceStore: Send {
    /// Persisted realtime preference, if any.
    fn get(&self) -> Option<bool>;

    fn set(&mut self, enabled: bool);

    fn clear(&mut self);

    /// A `Set-Cookie` value the client must apply for the last change, if the store is cookie-backed.
    fn take_set_cookie(&mut self) -> Option<String> {
        None
    }
}

/// Preference kept in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    value: Option<bool>,
}

impl MemoryPreferenceStore {
    pub fn new(value: Option<bool>) -> Self {
        Self { value }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self) -> Option<bool> {
        self.value
    }

    fn set(&mut self, enabled: bool) {
        self.value = Some(enabled);
    }

    fn clear(&mut self) {
        self.value = None;
    }
}

/// Cookie-backed preference scoped to one path; `Secure` under HTTPS.
#[derive(Debug, Clone)]
pub struct CookiePreferenceStore {
    name: String,
    ttl_secs: u64,
    path: String,
    secure: bool,
    value: Option<bool>,
    pending: Option<String>,
}

impl CookiePreferenceStore {
    /// Read the preference out of a request `Cookie` header.
    pub fn from_request(
        config: &CookieConfig,
        cookie_header: Option<&str>,
        path: &str,
        secure: bool,
    ) -> Self {
        let value = cookie_header.and_then(|h| cookie_value(h, &config.name)).map(|v| v == "true");
        Self {
            name: config.name.clone(),
            ttl_secs: config.ttl_secs,
            path: if path.is_empty() { "/".into() } else { path.into() },
            secure,
            value,
            pending: None,
        }
    }

    fn header(&self, value: &str, max_age: u64) -> String {
        let mut out = format!(
            "{}={}; Max-Age={}; Path={}; SameSite=Lax",
            self.name, value, max_age, self.path
        );
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// Value of cookie `name` in a `Cookie` header (`a=1; b=2`).
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v.trim())
    })
}

impl PreferenceStore for CookiePreferenceStore {
    fn get(&self) -> Option<bool> {
        self.value
    }

    fn set(&mut self, enabled: bool) {
        self.value = Some(enabled);
        self.pending = Some(self.header(if enabled { "true" } else { "false" }, self.ttl_secs));
    }

    fn clear(&mut self) {
        self.value = None;
        self.pending = Some(self.header("", 0));
    }

    fn take_set_cookie(&mut self) -> Option<String> {
        self.pending.take()
    }
}
