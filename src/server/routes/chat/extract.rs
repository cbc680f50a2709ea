use crate::error::VisadeskError;
use crate::service::QuestionInput;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use tracing::debug;
use visadesk_schema::QueryRequest;

pub(crate) struct QueryPayload(pub(crate) QuestionInput);

impl<S> FromRequest<S> for QueryPayload
where
    S: Send + Sync,
{
    type Rejection = VisadeskError;

    /// Deserialize a `POST /api/chat/query` body.
    ///
    /// Syntax errors become `INVALID_JSON`; missing fields, wrong types and a
    /// non-JSON content type become `INVALID_REQUEST`. Bounds are checked later
    /// by the query service.
    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<QueryRequest>::from_request(req, &()).await?;

        with_pretty_json_debug(&body, |pretty_body| {
            debug!(
                query_chars = body.query.chars().count(),
                has_user_id = body.user_id.is_some(),
                body = %pretty_body,
                "Extracted query request body"
            );
        });

        Ok(Self(QuestionInput {
            question: body.query,
            user_id: body.user_id,
        }))
    }
}
