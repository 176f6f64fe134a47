//! Table configuration.

use serde::Deserialize;
use std::fmt;

/// Credentials handed to the store's authorization handshake. Opaque to the
/// engine.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub private_key: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, private_key: impl Into<String>) -> Credentials {
        Credentials {
            email: email.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Where a table lives and how to reach it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TableConfig {
    /// Document identifier on the grid backend.
    pub table_id: String,
    /// Sheet (tab) name; None means the first tab.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub credentials: Credentials,
}

impl TableConfig {
    pub fn new(table_id: impl Into<String>) -> TableConfig {
        TableConfig {
            table_id: table_id.into(),
            ..TableConfig::default()
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> TableConfig {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> TableConfig {
        self.credentials = credentials;
        self
    }
}
