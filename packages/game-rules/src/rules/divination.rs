use serde::{Deserialize, Serialize};

use crate::models::{PlayerId, Role, RoleAssignment};

/// What the detective learns about one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub target: PlayerId,
    pub is_killer: bool,
}

pub fn investigate(target: &PlayerId, assignment: &RoleAssignment) -> Option<Investigation> {
    assignment.get(target).map(|role| Investigation {
        target: target.clone(),
        is_killer: *role == Role::Killer,
    })
}
