//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO
//! - A `Deserialize` update DTO (all `Option` fields) for partial updates
//! - The summary projection embedded when the entity is referenced

pub mod contractor;
pub mod customer;
pub mod employee;
pub mod status;
pub mod task;
pub mod user;
