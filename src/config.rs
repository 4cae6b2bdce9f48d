use crate::error::CalcError;
use crate::gpa::CgpaPolicy;
use crate::grade::GradeTable;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON config file read at sidecar startup.
pub const CONFIG_ENV: &str = "GRADECALC_CONFIG";

/// Grading scale and CGPA policy used for every calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalcConfig {
    pub grade_table: GradeTable,
    pub cgpa_policy: CgpaPolicy,
}

impl CalcConfig {
    pub fn from_json_str(text: &str) -> Result<Self, CalcError> {
        serde_json::from_str(text).map_err(|e| CalcError::new("bad_config", e.to_string()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Apply a partial update. Missing or null keys keep their current value;
    /// on error nothing is changed.
    pub fn apply_patch(&mut self, raw: &serde_json::Value) -> Result<(), CalcError> {
        let Some(obj) = raw.as_object() else {
            return Err(CalcError::new("bad_params", "config must be an object"));
        };

        let grade_table = match obj.get("gradeTable") {
            None => None,
            Some(v) if v.is_null() => None,
            Some(v) => {
                let table: GradeTable = serde_json::from_value(v.clone()).map_err(|e| {
                    CalcError::new("bad_grade_table", e.to_string())
                })?;
                Some(table)
            }
        };

        let cgpa_policy = match obj.get("cgpaPolicy") {
            None => None,
            Some(v) if v.is_null() => None,
            Some(v) => {
                let policy: CgpaPolicy = serde_json::from_value(v.clone()).map_err(|_| {
                    CalcError::new(
                        "bad_params",
                        "cgpaPolicy must be one of: twoStage, creditWeighted",
                    )
                    .with_details(v.clone())
                })?;
                Some(policy)
            }
        };

        if let Some(t) = grade_table {
            self.grade_table = t;
        }
        if let Some(p) = cgpa_policy {
            self.cgpa_policy = p;
        }
        Ok(())
    }
}
