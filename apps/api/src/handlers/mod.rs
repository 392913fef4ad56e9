//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, validate with kasir-core, call a kasir-db
//! repository, map errors through [`ApiError`](crate::error::ApiError).

pub mod category;
pub mod checkout;
pub mod health;
pub mod product;
pub mod report;
