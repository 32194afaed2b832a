// src/web/types.rs
use crate::classifier::RolePrediction;
use crate::recommend::Recommendation;
use rocket::serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PredictRequest {
    pub skills: Vec<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PredictionData {
    pub skills: Vec<String>,
    pub predictions: Vec<RolePrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    pub missing_skills: Vec<String>,
    pub matched_skills: Vec<String>,
}

impl From<Recommendation> for PredictionData {
    fn from(rec: Recommendation) -> Self {
        Self {
            skills: rec.query_skills,
            predictions: rec.predictions,
            target_role: rec.target_role,
            missing_skills: rec.missing_skills,
            matched_skills: rec.matched_skills,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthData {
    pub status: &'static str,
    pub roles: Vec<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}
