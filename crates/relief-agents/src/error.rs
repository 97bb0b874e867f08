//! Error types for the relief-agents crate.
//!
//! Agents never panic on bad input. Each handler returns an [`AgentError`];
//! the agent's [`Subscriber`](relief_broker::Subscriber) impl converts it
//! into a [`DeliveryError`] which the broker logs and isolates.

use relief_broker::DeliveryError;
use relief_types::{AgentId, PayloadKind, Resource, Skill, TaskId, TaskStatus, Topic};
use relief_world::ContextError;

/// Errors that can occur while an agent handles a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The pool could not cover a request in full.
    #[error("insufficient {resource}: requested {requested}, only {available} available")]
    InsufficientResources {
        /// The resource requested.
        resource: Resource,
        /// Quantity requested.
        requested: u32,
        /// Quantity that was available at the time.
        available: u32,
    },

    /// No available volunteer has the skill a task needs.
    #[error("no available volunteer with {skill} for task {task_id}")]
    NoAvailableVolunteer {
        /// The pending task.
        task_id: TaskId,
        /// The skill it requires.
        skill: Skill,
    },

    /// An action that needs a declared disaster arrived before the declaration.
    #[error("disaster has not been declared")]
    DisasterNotDeclared,

    /// A task id that this agent never created.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A task lifecycle step that is not allowed from the current state.
    #[error("task {task_id} cannot move from {from:?} to {to:?}")]
    InvalidTaskTransition {
        /// The task.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A message whose payload this agent does not handle on this topic.
    #[error("unexpected {actual:?} payload on {topic}")]
    UnexpectedPayload {
        /// Topic of the message.
        topic: Topic,
        /// The payload kind received.
        actual: PayloadKind,
    },

    /// The shared context rejected an operation.
    #[error("context error: {source}")]
    Context {
        /// The underlying context error.
        #[from]
        source: ContextError,
    },
}

impl AgentError {
    /// Convert into the broker's isolated failure type.
    pub fn into_delivery(self, agent: &AgentId, topic: &Topic) -> DeliveryError {
        DeliveryError::rejected(agent, topic, self)
    }
}
