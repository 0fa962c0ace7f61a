//! Live patient search.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::forms::SearchQuery;
use crate::api::types::{today, ApiContext};
use crate::registry::{self, PatientSearchHit};

/// `GET /search_patients?q=`: at most ten hits; blank query gives `[]`.
pub async fn patients(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PatientSearchHit>>, ApiError> {
    let hits = {
        let conn = ctx.core.db()?;
        registry::search(&conn, &query.q, today())?
    };
    Ok(Json(hits))
}
