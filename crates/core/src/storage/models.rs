//! Database models

use serde::{Deserialize, Serialize};

use crate::oracle::ApiSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSettings {
    pub settings: ApiSettings,
    /// Unix seconds of the last save.
    pub updated_at: u64,
}
