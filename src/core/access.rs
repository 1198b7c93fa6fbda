//! Role-based access control.
//!
//! Every gated route names an [`AccessRule`]; [`authorize`] turns the caller's
//! role (or lack of one) into an [`AccessDecision`]. The web guards are thin
//! wrappers around this function, which keeps the policy testable without HTTP.

use crate::entities::Role;

/// What a route requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Any signed-in user
    Authenticated,
    /// Admins only
    AdminOnly,
    /// Workers only
    WorkerOnly,
    /// Either role
    AdminOrWorker,
}

impl AccessRule {
    /// True if a user holding `role` satisfies the rule.
    #[must_use]
    pub const fn allows(self, role: Role) -> bool {
        match self {
            Self::Authenticated | Self::AdminOrWorker => true,
            Self::AdminOnly => role.is_admin(),
            Self::WorkerOnly => role.is_worker(),
        }
    }
}

/// Result of checking a caller against a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Proceed,
    /// Signed in, wrong role
    Forbidden,
    /// Not signed in
    RedirectToLogin,
}

/// Decides whether a caller may proceed.
///
/// No identity always redirects to login; a wrong role is always forbidden.
#[must_use]
pub const fn authorize(role: Option<Role>, rule: AccessRule) -> AccessDecision {
    match role {
        None => AccessDecision::RedirectToLogin,
        Some(role) if rule.allows(role) => AccessDecision::Proceed,
        Some(_) => AccessDecision::Forbidden,
    }
}

/// Operations on a farm record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Create,
    View,
    Edit,
    Delete,
}

impl RecordAction {
    /// Workers may only enter new records; everything else is admin work.
    #[must_use]
    pub const fn required_rule(self) -> AccessRule {
        match self {
            Self::Create => AccessRule::AdminOrWorker,
            Self::View | Self::Edit | Self::Delete => AccessRule::AdminOnly,
        }
    }
}
