//! OpenAPI document for the Delve Web API

use utoipa::OpenApi;

use crate::handlers::{
    CapabilitiesResponse, ErrorResponse, HealthResponse, ResearchApiRequest, ResearchApiResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Delve Web API",
        version = "0.1.0",
        description = "Fact-grounded research reports from web and social sources",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::research,
        crate::handlers::capabilities,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ResearchApiRequest,
            ResearchApiResponse,
            CapabilitiesResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Research", description = "Research pipeline operations"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Delve Web API");
        assert_eq!(openapi.info.version, "0.1.0");
        assert!(openapi.paths.paths.contains_key("/api/research"));
        assert!(openapi.paths.paths.contains_key("/api/health"));
        assert!(openapi.paths.paths.contains_key("/api/capabilities"));
    }

    #[test]
    fn test_openapi_json() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        assert!(json.contains("Delve Web API"));
        assert!(json.contains("ResearchApiResponse"));
    }
}
