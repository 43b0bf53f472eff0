use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Juris API",
        version = "0.1.0",
        description = "Jurisprudence search across Brazilian court portals."
    ),
    paths(
        crate::routes::search,
        crate::routes::list_sources,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::ResultItemResponse,
        crate::dto::SourceErrorResponse,
        crate::dto::SearchResponseBody,
        crate::dto::SourceEntryResponse,
        crate::dto::SourceListResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "search", description = "Fan-out search over tribunal sites"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
