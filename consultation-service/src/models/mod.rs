use serde::{Deserialize, Serialize};

/// Inbound visit record submitted for summarization.
///
/// All fields are required free-form text; presence is the only validation.
/// The record lives for the duration of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub patient_name: String,
    pub date_of_visit: String,
    pub notes: String,
}
