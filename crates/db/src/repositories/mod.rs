//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row reads are ordered
//! newest first, with `id` breaking ties.

pub mod contractor_repo;
pub mod customer_repo;
pub mod employee_repo;
pub mod task_repo;
pub mod user_repo;

pub use contractor_repo::ContractorRepo;
pub use customer_repo::CustomerRepo;
pub use employee_repo::EmployeeRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
