use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use tera::Context;
use uuid::Uuid;

use crate::web::models::{ChatRequest, ChatResponse};
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let context = Context::new();
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint. The body is taken raw so that malformed JSON still gets a 400, not an extractor error.
pub async fn chat(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let request = ChatRequest::from_body(&body);
    let user_msg = request.trimmed();

    if user_msg.is_empty() {
        return HttpResponse::BadRequest().json(ChatResponse {
            reply: "Please send a message".to_string(),
        });
    }

    let request_id = Uuid::new_v4();
    info!("Chat request {}: {} characters", request_id, user_msg.len());

    let reply = match data.model.complete(user_msg).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(
                "Chat request {} failed upstream (status {:?}): {}",
                request_id,
                e.status(),
                e
            );
            return HttpResponse::InternalServerError().json(ChatResponse::error(e));
        }
    };

    match data.store.insert(user_msg, &reply).await {
        Ok(record) => {
            info!("Chat request {} saved as record {}", request_id, record.id);
            HttpResponse::Ok().json(ChatResponse { reply })
        }
        Err(e) => {
            error!("Chat request {} could not be saved: {}", request_id, e);
            HttpResponse::InternalServerError().json(ChatResponse::error(e))
        }
    }
}

// History endpoint: every stored exchange as a [user, bot] pair, oldest first.
pub async fn history(data: web::Data<AppState>) -> impl Responder {
    match data.store.list_all().await {
        Ok(records) => {
            let pairs: Vec<(String, String)> = records
                .into_iter()
                .map(|record| (record.user, record.bot))
                .collect();
            HttpResponse::Ok().json(pairs)
        }
        Err(e) => {
            error!("Failed to read chat history: {}", e);
            HttpResponse::InternalServerError().json(ChatResponse::error(e))
        }
    }
}
