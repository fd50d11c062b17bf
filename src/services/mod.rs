//! Typed wrappers over backend endpoints.
//!
//! Each service owns a cheap clone of [`ApiClient`](crate::api::ApiClient)
//! and returns `Result<T, ApiError>`; an empty body maps to an empty list,
//! `None` or the type's default.

mod auth;
mod constructions;
mod licenses;
mod monitoring;
mod organizations;
mod transmission;

pub use auth::AuthService;
pub use constructions::ConstructionService;
pub use licenses::LicenseService;
pub use monitoring::{MonitoringService, ReadingFilter};
pub use organizations::OrganizationService;
pub use transmission::TransmissionService;
