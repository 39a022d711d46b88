pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod rider_repo;
pub use rider_repo::RiderShiftRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod table_repo;
pub use table_repo::TableRepository;
