use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProofDoc {
    #[schema(value_type = Option<Object>)]
    pub proof_data: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub public_data: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub external_inputs: Option<serde_json::Value>,
    pub is_local: bool,
    pub blueprint_slug: String,
}

#[derive(Serialize, ToSchema)]
pub struct PublishLeakDoc {
    /// 1..=500 characters after trimming; longer input is clipped.
    pub description: String,
    pub proof: ProofDoc,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeakDoc {
    pub id: Uuid,
    pub description: String,
    pub proof: ProofDoc,
    /// ISO 8601, UTC, millisecond precision.
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct PublishedDoc { pub success: bool, pub leak: LeakDoc }

#[derive(Serialize, ToSchema)]
pub struct CreateLeakRequestDoc {
    /// 3..=120 characters after trimming.
    pub title: String,
    /// 10..=2000 characters after trimming.
    pub details: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeakRequestDoc {
    pub id: Uuid,
    pub title: String,
    pub details: String,
    pub likes: u64,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct RequestItemDoc { pub success: bool, pub item: LeakRequestDoc }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuesDoc {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub issues: Option<IssuesDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::leaks::publish,
        crate::routes::leaks::list,
        crate::routes::requests::list,
        crate::routes::requests::create,
        crate::routes::requests::like,
    ),
    components(
        schemas(
            HealthResponse,
            ProofDoc,
            PublishLeakDoc,
            LeakDoc,
            PublishedDoc,
            CreateLeakRequestDoc,
            LeakRequestDoc,
            RequestItemDoc,
            IssuesDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "leaks"),
        (name = "requests")
    )
)]
pub struct ApiDoc;
