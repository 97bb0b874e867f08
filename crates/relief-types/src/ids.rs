//! Type-safe identifier wrappers.
//!
//! Entities created inside the simulation (messages, tasks, victim requests)
//! carry UUID v7 identifiers so that their natural ordering follows creation
//! time. Entities named by the outside world (agents, volunteers, rescue
//! teams) carry string identifiers chosen by the driver.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around an externally chosen [`String`] name.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a name chosen by the caller.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }
    };
}

define_id! {
    /// Unique identifier for a published message.
    MessageId
}

define_id! {
    /// Unique identifier for a task synthesized from an allocation plan.
    TaskId
}

define_id! {
    /// Unique identifier for a victim request recorded by the communication agent.
    VictimRequestId
}

define_name! {
    /// Name of a logical agent attached to the broker.
    AgentId
}

define_name! {
    /// Identifier of a registered volunteer.
    VolunteerId
}

define_name! {
    /// Identifier of a rescue team reporting its location.
    TeamId
}

impl AgentId {
    /// The external driver that seeds scenario events.
    pub fn driver() -> Self {
        Self::new("driver")
    }

    /// The relief coordinator agent.
    pub fn relief_coordinator() -> Self {
        Self::new("relief_coordinator")
    }

    /// The volunteer coordinator agent.
    pub fn volunteer_coordinator() -> Self {
        Self::new("volunteer_coordinator")
    }

    /// The communication agent.
    pub fn communication() -> Self {
        Self::new("communication")
    }

    /// The analytics and prediction agent.
    pub fn analytics() -> Self {
        Self::new("analytics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let first = TaskId::new();
        let second = TaskId::new();
        assert_ne!(first, second);
        assert_ne!(first.into_inner(), Uuid::nil());
    }

    #[test]
    fn names_serialize_transparently() {
        let id = VolunteerId::new("vol_1");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"vol_1\""));
    }

    #[test]
    fn well_known_agents_are_distinct() {
        assert_ne!(AgentId::analytics(), AgentId::communication());
        assert_eq!(AgentId::driver().as_str(), "driver");
    }
}
