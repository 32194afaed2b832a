// src/web/handlers.rs
use super::types::*;
use crate::recommend::Recommender;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub async fn predict_handler(
    request: Json<PredictRequest>,
    recommender: &State<Recommender>,
) -> Result<Json<DataResponse<PredictionData>>, status::Custom<Json<StandardErrorResponse>>> {
    let request = request.into_inner();

    if request.skills.iter().all(|s| s.trim().is_empty()) {
        warn!("Prediction requested without skills");
        return Err(status::Custom(
            Status::BadRequest,
            Json(StandardErrorResponse::new(
                "No skills provided".to_string(),
                "EMPTY_SKILLS".to_string(),
                vec!["Send at least one skill, e.g. {\"skills\": [\"python\"]}".to_string()],
            )),
        ));
    }

    let recommendation = recommender.recommend(&request.skills, request.top_k);
    info!(
        "Predicted {:?} for {} skills",
        recommendation.target_role,
        recommendation.query_skills.len()
    );

    Ok(Json(DataResponse::success(
        "Role prediction completed".to_string(),
        recommendation.into(),
    )))
}

pub async fn health_handler(recommender: &State<Recommender>) -> Json<DataResponse<HealthData>> {
    Json(DataResponse::success(
        "OK".to_string(),
        HealthData {
            status: "ok",
            roles: recommender.classes().to_vec(),
        },
    ))
}
