//! Operator roles recognised by the back office.

/// Access level attached to a signed-in operator.
///
/// Superusers map to rows in the `superuser` table and are verified against
/// a locally stored password hash. Admins map to rows in `administrators`
/// and are verified through the backend auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superuser,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Superuser => "superuser",
            Self::Admin => "admin",
        };
        f.write_str(label)
    }
}
