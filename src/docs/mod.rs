use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Collaboration dispatcher is down", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Relay and process statistics
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Current statistics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = InsertUser,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_user_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_user_doc() {}

#[utoipa::path(
    get,
    path = "/api/users/{id}/documents",
    params(("id" = i64, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Documents owned by the user", body = [Document])
    )
)]
#[allow(dead_code)]
pub async fn get_user_documents_doc() {}

/// Create a document
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body = InsertDocument,
    responses(
        (status = 200, description = "Document created", body = Document),
        (status = 400, description = "Invalid body", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_document_doc() {}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = Document),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_document_doc() {}

#[utoipa::path(
    get,
    path = "/api/documents/share/{share_link}",
    params(("share_link" = String, Path, description = "Share link, e.g. doc-3k9x0a1bz")),
    responses(
        (status = 200, description = "The shared document", body = Document),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_document_by_share_link_doc() {}

#[utoipa::path(
    post,
    path = "/api/documents/{id}/versions",
    params(("id" = i64, Path, description = "Document id")),
    request_body = CreateVersionRequest,
    responses(
        (status = 200, description = "Version saved", body = DocumentVersion),
        (status = 400, description = "Invalid body", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_version_doc() {}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/versions",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Versions, newest first", body = [DocumentVersion])
    )
)]
#[allow(dead_code)]
pub async fn get_document_versions_doc() {}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/messages",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Chat history, oldest first", body = [ChatMessage])
    )
)]
#[allow(dead_code)]
pub async fn get_chat_messages_doc() {}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/collaborators",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Users who joined the document", body = [User])
    )
)]
#[allow(dead_code)]
pub async fn get_document_collaborators_doc() {}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}/collaborators/{user_id}",
    params(
        ("id" = i64, Path, description = "Document id"),
        ("user_id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "Collaborator removed")
    )
)]
#[allow(dead_code)]
pub async fn remove_collaborator_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        create_user_doc,
        get_user_doc,
        get_user_documents_doc,
        create_document_doc,
        get_document_doc,
        get_document_by_share_link_doc,
        create_version_doc,
        get_document_versions_doc,
        get_chat_messages_doc,
        get_document_collaborators_doc,
        remove_collaborator_doc,
    ),
    components(
        schemas(
            HealthResponse,
            DiagnosticsResponse,
            ErrorResponse,
            User,
            InsertUser,
            Document,
            InsertDocument,
            DocumentVersion,
            CreateVersionRequest,
            ChatMessage,
        )
    ),
    tags(
        (name = "api", description = "Collaborative editor REST endpoints")
    )
)]
pub struct ApiDoc;
