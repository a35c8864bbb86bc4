use axum::http::HeaderMap;

pub const PASSPHRASE_HEADER: &str = "x-manager-passphrase";

/// Shared manager passphrase in front of closing, reports and catalog
/// refresh. It only keeps floor staff from wandering into those screens by
/// accident; it is not authentication.
#[derive(Debug, Clone)]
pub struct ManagerGate {
    passphrase: String,
}

impl ManagerGate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn admits(&self, supplied: Option<&str>) -> bool {
        supplied == Some(self.passphrase.as_str())
    }

    pub fn admits_headers(&self, headers: &HeaderMap) -> bool {
        let supplied = headers
            .get(PASSPHRASE_HEADER)
            .and_then(|value| value.to_str().ok());
        self.admits(supplied)
    }
}
