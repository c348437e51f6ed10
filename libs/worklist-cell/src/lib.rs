pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::*;
pub use models::*;
pub use router::worklist_routes;
pub use services::queue::ProviderWorklistService;
