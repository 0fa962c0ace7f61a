//! Front page.

use axum::extract::State;
use axum::http::HeaderMap;

use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::types::{today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::{dashboard, db};

/// `GET /`: clinic statistics and the patient list.
pub async fn index(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let today = today();
    let (stats, patients) = {
        let conn = ctx.core.db()?;
        (dashboard::collect_stats(&conn, today, &chrono::Local)?, db::list_patients(&conn)?)
    };

    Ok(HtmlPage::new("Panel", views::dashboard(&stats, &patients, today))
        .with_flash(Flash::from_headers(&headers)))
}
