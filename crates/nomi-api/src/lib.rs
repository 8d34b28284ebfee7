//! Client for the Nomi REST API
//!
//! Every remote operation is described by a [`RemoteCall`] (method, path
//! segments and optional JSON body) and executed through the [`NomiApi`]
//! trait. [`NomiClient`] is the HTTP implementation.
//!
//! The client does not interpret response bodies. Successful responses are
//! returned as raw JSON, `204 No Content` becomes `{"success": true}`, and any
//! other outcome is an [`ApiError`].

pub mod call;
pub mod client;
pub mod error;

pub use call::{Method, RemoteCall};
pub use client::{DEFAULT_BASE_URL, NomiApi, NomiClient};
pub use error::{ApiError, Result};
