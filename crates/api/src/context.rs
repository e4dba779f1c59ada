use keystone_auth::{Principal, User};
use keystone_core::UserId;

/// The authenticated caller of a request.
///
/// Carries both the stored user (for rendering) and the resolved principal
/// (for authorization decisions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user: User,
    principal: Principal,
}

impl CurrentUser {
    pub fn new(user: User, principal: Principal) -> Self {
        Self { user, principal }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// Identity resolved for every request: `None` for anonymous callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(Option<CurrentUser>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(user: CurrentUser) -> Self {
        Self(Some(user))
    }

    pub fn current(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(CurrentUser::user)
    }
}
