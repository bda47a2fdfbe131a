//! Service layer configuration.

use serde::{Deserialize, Serialize};

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub retention: RetentionConfig,
    pub employee_numbers: EmployeeNumberConfig,
    pub auto_sync: AutoSyncConfig,
}

/// Post-termination retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub retention_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        // Three years.
        Self {
            retention_days: 1095,
        }
    }
}

/// Generated employee-number shape: `{prefix}-{year}-{sequence}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeNumberConfig {
    pub prefix: String,
}

impl Default for EmployeeNumberConfig {
    fn default() -> Self {
        Self {
            prefix: "EMP".to_string(),
        }
    }
}

/// Commit-triggered auto-sync coordinator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSyncConfig {
    pub enabled_on_start: bool,
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            enabled_on_start: true,
        }
    }
}
