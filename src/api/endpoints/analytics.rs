//! Clinic-wide charts.

use axum::extract::State;
use axum::http::HeaderMap;

use crate::analytics;
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::types::{today, ApiContext};
use crate::api::views::{self, HtmlPage};

/// `GET /analytics`: counts and pie charts. Failures render an empty page.
///
/// Only the counting holds the connection lock; charts are drawn on the
/// blocking pool afterwards.
pub async fn page(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let counted = {
        let conn = ctx.core.db()?;
        analytics::collect_distributions(&conn, today())
    };

    let page = match counted {
        Ok(distributions) => {
            let static_dir = ctx.core.config.static_dir();
            tokio::task::spawn_blocking(move || analytics::render_page(distributions, &static_dir))
                .await?
        }
        Err(e) => analytics::unavailable(&e),
    };

    Ok(HtmlPage::new("Estadísticas", views::analytics(&page))
        .with_flash(Flash::from_headers(&headers)))
}
