//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{guest_logs, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "City Indoor Pool Guest Logger API",
        version = "0.3.0",
        description = "Guest count time series of the City indoor pool",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        health::health_check,
        health::readiness_check,
        guest_logs::latest,
        guest_logs::history,
        guest_logs::daily,
        guest_logs::log_guest_count,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::models::sample::StoredSample,
            crate::models::sample::LogResponse,
            crate::models::daily::DailyAggregate,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health checks"),
        (name = "guest_logs", description = "Guest count time series")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
