use axum::Json;
use filebridge_core::models::EncodingsResponse;

#[utoipa::path(
    get,
    path = "/api/v0/encodings",
    tag = "encodings",
    responses(
        (status = 200, description = "Accepted source and target encodings", body = EncodingsResponse)
    )
)]
pub async fn list_encodings() -> Json<EncodingsResponse> {
    Json(EncodingsResponse::supported())
}
