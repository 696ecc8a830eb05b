use serde::Serialize;

/// The capacities in which an employee acts on a request. One employee may
/// hold several at once (a jefe swapping their own guard, for instance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActorRoles {
    pub requester: bool,
    pub counterpart: bool,
    pub supervisor: bool,
}

impl ActorRoles {
    pub fn none(&self) -> bool {
        !(self.requester || self.counterpart || self.supervisor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    /// The current state admits no further transitions.
    Terminal,
    /// The actor has no relation to the request.
    NoRole,
    /// The edge is not in the table for any of the actor's roles.
    NotAllowed,
}
