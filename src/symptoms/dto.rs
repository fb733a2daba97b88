use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::records::SymptomLog;

#[derive(Debug, Deserialize)]
pub struct LogSymptomRequest {
    pub user_id: Uuid,
    pub symptom: String,
    pub severity: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogSymptomResponse {
    pub symptom_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SymptomsResponse {
    pub symptoms: Vec<SymptomLog>,
}

#[derive(Debug, Serialize)]
pub struct SymptomAnalysisResponse {
    pub analysis: String,
    pub symptom_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}
