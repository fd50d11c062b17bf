//! Cached REST client for the water-resource monitoring and licensing backend.
//!
//! [`api::ApiClient`] is the request pipeline, [`cache::CacheLayer`] memoizes
//! reference data on top of a [`store::KeyValueStore`], and [`services`] wraps
//! individual endpoints.

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod services;
pub mod store;
