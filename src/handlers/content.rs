use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::content_service::ContentService;
use crate::domain::content::{ContentBlock, ContentOrigin};
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentResponse {
    pub key: String,
    #[schema(value_type = Object)]
    pub body: Value,
    /// `store` when served from the database, `default` for bundled content.
    pub origin: String,
}

impl From<ContentBlock> for ContentResponse {
    fn from(block: ContentBlock) -> Self {
        let origin = match block.origin {
            ContentOrigin::Store => "store",
            ContentOrigin::Default => "default",
        };
        ContentResponse {
            key: block.key,
            body: block.body,
            origin: origin.to_string(),
        }
    }
}

/// GET /content/{key}
#[utoipa::path(
    get,
    path = "/content/{key}",
    params(("key" = String, Path, description = "Content block key, e.g. home_hero")),
    responses(
        (status = 200, description = "Content block", body = ContentResponse),
        (status = 404, description = "No stored or default content for the key"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "content"
)]
pub async fn get_content(
    service: web::Data<ContentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();

    let block = web::block(move || service.get(&key))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ContentResponse::from(block)))
}
