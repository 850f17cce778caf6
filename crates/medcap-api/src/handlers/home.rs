use axum::response::Html;

/// Serve the upload page.
#[utoipa::path(
    get,
    path = "/",
    tag = "ui",
    responses(
        (status = 200, description = "Upload page", body = String, content_type = "text/html")
    )
)]
pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
