// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::recommend::Recommender;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/predict", data = "<request>")]
pub async fn predict(
    request: Json<PredictRequest>,
    recommender: &State<Recommender>,
) -> Result<Json<DataResponse<PredictionData>>, status::Custom<Json<StandardErrorResponse>>> {
    handlers::predict_handler(request, recommender).await
}

#[get("/health")]
pub async fn health(recommender: &State<Recommender>) -> Json<DataResponse<HealthData>> {
    handlers::health_handler(recommender).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Check your request JSON format".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Available endpoints: POST /api/predict, GET /api/health".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Send {\"skills\": [\"python\", \"sql\"]} with an optional \"top_k\"".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

pub fn build_rocket(recommender: Recommender) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(recommender)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount("/api", routes![predict, health, options])
}

pub async fn start_web_server(recommender: Recommender, port: u16) -> Result<()> {
    info!("Starting role prediction API on port {}", port);
    info!("Known roles: {:?}", recommender.classes());

    let figment = rocket::Config::figment().merge(("port", port));
    if let Err(e) = build_rocket(recommender).configure(figment).launch().await {
        error!("Server stopped with an error: {}", e);
        anyhow::bail!("Rocket failed to launch: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationRow, AssociationTable};
    use crate::classifier::{RoleClassifier, TrainOptions};
    use crate::core::config_manager::InferenceConfig;
    use crate::profiles::Profile;
    use crate::skills::SkillVocabulary;
    use rocket::http::ContentType;
    use rocket::local::blocking::Client;

    fn recommender() -> Recommender {
        let profiles: Vec<Profile> = (0..6)
            .map(|i| {
                let (role, skills) = if i % 2 == 0 {
                    ("Data Engineer", vec!["python", "sql"])
                } else {
                    ("Frontend Engineer", vec!["react", "css"])
                };
                Profile {
                    target_role: Some(role.to_string()),
                    ..Profile::new(&format!("p{i}"), 7.0, skills)
                }
            })
            .collect();
        let model = RoleClassifier::new(TrainOptions {
            n_estimators: 5,
            ..TrainOptions::default()
        })
        .train(&profiles)
        .unwrap()
        .model;
        let table = AssociationTable::from_rows(vec![AssociationRow {
            role: "Data Engineer".to_string(),
            skill: "aws".to_string(),
            count: 1,
            role_postings: 1,
            conditional_probability: 1.0,
        }]);
        Recommender::new(SkillVocabulary::builtin(), model, table, &InferenceConfig::default())
    }

    fn client() -> Client {
        Client::tracked(build_rocket(recommender())).unwrap()
    }

    #[test]
    fn test_health_lists_roles() {
        let client = client();
        let response = client.get("/api/health").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
        let body = response.into_string().unwrap();
        assert!(body.contains("Data Engineer"));
    }

    #[test]
    fn test_predict_returns_ranked_roles() {
        let client = client();
        let response = client
            .post("/api/predict")
            .header(ContentType::JSON)
            .body(r#"{"skills": ["Python", "SQL"], "top_k": 2}"#)
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = serde_json::from_str(&response.into_string().unwrap()).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["predictions"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["skills"], serde_json::json!(["python", "sql"]));
    }

    #[test]
    fn test_predict_without_skills_is_rejected() {
        let client = client();
        let response = client
            .post("/api/predict")
            .header(ContentType::JSON)
            .body(r#"{"skills": []}"#)
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_string().unwrap();
        assert!(body.contains("EMPTY_SKILLS"));
    }

    #[test]
    fn test_predict_with_blank_skills_is_rejected() {
        let client = client();
        let response = client
            .post("/api/predict")
            .header(ContentType::JSON)
            .body(r#"{"skills": ["  ", ""]}"#)
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test]
    fn test_malformed_body_hits_json_catcher() {
        let client = client();
        let response = client
            .post("/api/predict")
            .header(ContentType::JSON)
            .body(r#"{"skill": "python"}"#)
            .dispatch();
        assert_eq!(response.status(), Status::UnprocessableEntity);
        assert!(response.into_string().unwrap().contains("UNPROCESSABLE_ENTITY"));
    }
}
