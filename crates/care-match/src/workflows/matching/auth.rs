//! Role gate evaluated first on every operation.

use super::domain::{Actor, ActorId, Role};

/// Outcome of evaluating an inbound actor against an operation's required
/// role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed { id: ActorId, role: Role },
    /// No resolvable identity; maps to a 401-class outcome.
    Unauthenticated,
    /// Identity resolved but role not in the required set; 403-class.
    Forbidden,
}

/// Check an optional actor against the roles an operation requires. An empty
/// `required` slice admits any authenticated actor. Pure; no side effects.
pub fn authorize(actor: Option<&Actor>, required: &[Role]) -> AccessDecision {
    let Some(actor) = actor else {
        return AccessDecision::Unauthenticated;
    };

    if required.is_empty() || required.contains(&actor.role) {
        AccessDecision::Allowed {
            id: actor.id.clone(),
            role: actor.role,
        }
    } else {
        AccessDecision::Forbidden
    }
}
