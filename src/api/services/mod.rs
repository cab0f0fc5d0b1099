pub mod health;
pub mod redirect;
pub mod tracer;

pub use health::{health_check, health_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use tracer::tracer_api_routes;
