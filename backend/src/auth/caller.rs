use serde::Serialize;

use crate::db::Role;

/// The authenticated identity behind a request, resolved from its session token.
///
/// Every tenant-scoped service call receives one of these explicitly instead of
/// reading tenant or user state from anywhere else.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Caller {
    pub user_id: i64,
    pub tenant_id: i64,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn belongs_to(&self, tenant_id: i64) -> bool {
        self.tenant_id == tenant_id
    }
}
