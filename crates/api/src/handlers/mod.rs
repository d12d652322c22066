pub mod auth;
pub mod contractor;
pub mod customer;
pub mod employee;
pub mod task;
