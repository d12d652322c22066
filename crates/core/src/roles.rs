//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_USER: &str = "user";
pub const ROLE_SUPERADMIN: &str = "superadmin";

/// Username of the account created by the startup bootstrap.
pub const SUPERADMIN_USERNAME: &str = "superadmin";

/// All assignable roles.
pub const ALL_ROLES: &[&str] = &[ROLE_USER, ROLE_SUPERADMIN];

/// Returns `true` if `role` is one of [`ALL_ROLES`].
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
