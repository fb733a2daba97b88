use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::records::Medication;

#[derive(Debug, Deserialize)]
pub struct AddMedicationRequest {
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Serialize)]
pub struct AddMedicationResponse {
    pub medication_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MedicationsResponse {
    pub medications: Vec<Medication>,
}

#[derive(Debug, Deserialize)]
pub struct TakeMedicationRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Debug, Serialize)]
pub struct TakeMedicationResponse {
    pub log_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateMedicationRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeactivateMedicationResponse {
    pub medication_id: Uuid,
    pub active: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}
