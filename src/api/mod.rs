//! HTTP surface of the clinic.
//!
//! HTML pages rendered on the server, form posts answered with a
//! `303 See Other` and a flash cookie, PDF downloads, and a JSON patient
//! search. `clinic_router()` returns a `Router` that can be mounted on any
//! axum server instance; `serve()` runs it until Ctrl-C.

pub mod endpoints;
pub mod error;
pub mod flash;
pub mod forms;
pub mod router;
pub mod server;
pub mod types;
pub mod views;

pub use router::clinic_router;
pub use server::{serve, start_server, ClinicServer, ServerError};
pub use types::ApiContext;
