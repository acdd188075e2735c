//! Shared wire types and utilities for the Mintgate merchant API.
//!
//! This crate holds everything the client crate needs that does not touch
//! HTTP: the response envelope and pagination types the backend speaks, and
//! the query-parameter cleaning/serialization helpers that keep request URLs
//! free of empty filters.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod envelope;
pub mod params;
pub mod query;

pub use envelope::{BaseResponse, ErrorBody, ErrorData, Paginated, Pagination};
pub use params::{clean_params, is_empty_value, to_query_string};
pub use query::{ListQuery, SortOrder};
