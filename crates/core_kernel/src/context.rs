//! Acting-user context for audit stamping
//!
//! Every mutating operation in the billing core records who performed it.
//! The identity layer that authenticates requests lives outside this core;
//! what crosses the boundary is an [`ActorContext`] carrying the resolved
//! user id, if any. Services call [`ActorContext::require_user`] before
//! touching any store, so an unauthenticated caller fails with
//! `Unauthorized` rather than a business error.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifiers::UserId;

/// The acting user for a service call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    user: Option<UserId>,
}

impl ActorContext {
    /// Context for an authenticated user
    pub fn new(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// Context with no resolved user (read-only callers, failed auth)
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// Returns the acting user id, or `Unauthorized` if none was resolved
    pub fn require_user(&self) -> Result<UserId, CoreError> {
        self.user.ok_or(CoreError::Unauthorized)
    }

    /// Returns the acting user id without failing
    pub fn user(&self) -> Option<UserId> {
        self.user
    }
}
