//! HTTP endpoint handlers, one module per screen.
//!
//! Page handlers read the pending flash from the request cookies. Form
//! handlers never fail on bad input or rejected writes: they redirect
//! with an error flash instead. Only a missing parent record (404) or an
//! internal fault surfaces as [`ApiError`](crate::api::error::ApiError).

pub mod analytics;
pub mod dashboard;
pub mod diagnoses;
pub mod documents;
pub mod health;
pub mod patients;
pub mod payments;
pub mod prescriptions;
pub mod records;
pub mod search;

use std::fmt::Display;

use axum::response::Response;

use crate::api::flash::{redirect_with, Flash};

/// Redirect back with `"<what>: <err>"` flashed as an error.
pub(crate) fn rejected(location: &str, what: &str, err: impl Display) -> Response {
    tracing::warn!(error = %err, location, "{what}");
    redirect_with(location, Flash::error(format!("{what}: {err}")))
}

pub(crate) fn done(location: &str, message: impl Into<String>) -> Response {
    redirect_with(location, Flash::success(message))
}
