pub mod auth;
pub use auth::AuthService;
pub mod occupancy;
pub mod order_service;
pub use order_service::OrderService;
pub mod pricing;
pub mod rider_service;
pub use rider_service::RiderService;
pub mod session_service;
pub use session_service::SessionService;
