//! Volunteer coordinator: turns allocation plans into tasks and matches them
//! to volunteers.
//!
//! # Task lifecycle
//!
//! ```text
//! Pending --(assignment pass)--> Assigned --(task_completed)--> Completed
//! ```
//!
//! The assignment pass runs after every event this agent handles. It walks
//! pending tasks by descending urgency (ties by creation order) and gives
//! each one to the first available volunteer, in registration order, whose
//! skills include the task's required skill. A task with no match stays
//! pending; it is never dropped.

use std::collections::BTreeSet;

use relief_broker::{DeliveryError, Subscriber};
use relief_types::{
    AgentId, AllocationPlan, AssignmentNotice, Message, Payload, Skill, Task, TaskId, TaskStatus,
    Topic, Volunteer, VolunteerId,
};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::skills::required_skill_for;

/// Owns the volunteer registry and the task list.
#[derive(Debug)]
pub struct VolunteerCoordinator {
    id: AgentId,
    /// Registration order.
    volunteers: Vec<Volunteer>,
    /// Creation order.
    tasks: Vec<Task>,
}

impl Default for VolunteerCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl VolunteerCoordinator {
    /// Create a coordinator with no volunteers and no tasks.
    pub fn new() -> Self {
        Self {
            id: AgentId::volunteer_coordinator(),
            volunteers: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Registered volunteers in registration order.
    pub fn volunteers(&self) -> &[Volunteer] {
        &self.volunteers
    }

    /// All tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up one task.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Number of tasks still waiting for a volunteer.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .count()
    }

    /// Add or update a volunteer, then run the assignment pass.
    ///
    /// Re-registering an id replaces its skills and keeps its registration
    /// position. A volunteer currently holding a task stays unavailable until
    /// that task completes.
    pub fn register(&mut self, volunteer_id: &VolunteerId, skills: &BTreeSet<Skill>) -> Vec<Message> {
        if let Some(existing) = self.volunteers.iter_mut().find(|v| v.id == *volunteer_id) {
            existing.skills.clone_from(skills);
            let busy = self.tasks.iter().any(|t| {
                t.status == TaskStatus::Assigned && t.assignee.as_ref() == Some(volunteer_id)
            });
            existing.available = !busy;
            debug!(volunteer = %volunteer_id, busy = busy, "Volunteer re-registered");
        } else {
            self.volunteers.push(Volunteer {
                id: volunteer_id.clone(),
                skills: skills.clone(),
                available: true,
            });
            debug!(volunteer = %volunteer_id, skills = skills.len(), "Volunteer registered");
        }
        self.assign_pending()
    }

    /// Create a task for a committed plan, then run the assignment pass.
    pub fn add_plan(&mut self, plan: &AllocationPlan) -> Vec<Message> {
        let task = Task {
            id: TaskId::new(),
            description: format!(
                "Distribute {} {} to {}",
                plan.quantity, plan.resource, plan.area_name
            ),
            area_name: plan.area_name.clone(),
            resource: plan.resource,
            quantity: plan.quantity,
            required_skill: required_skill_for(plan.resource),
            urgency: plan.priority,
            status: TaskStatus::Pending,
            assignee: None,
        };
        info!(
            task = %task.id,
            area = %task.area_name,
            skill = %task.required_skill,
            urgency = %task.urgency,
            "Task created"
        );
        self.tasks.push(task);
        self.assign_pending()
    }

    /// Mark an assigned task completed, free its volunteer, then run the
    /// assignment pass.
    pub fn complete(&mut self, task_id: TaskId) -> Result<Vec<Message>, AgentError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(AgentError::TaskNotFound(task_id))?;
        if task.status != TaskStatus::Assigned {
            return Err(AgentError::InvalidTaskTransition {
                task_id,
                from: task.status,
                to: TaskStatus::Completed,
            });
        }
        task.status = TaskStatus::Completed;
        let freed = task.assignee.clone();

        if let Some(volunteer) = freed
            .as_ref()
            .and_then(|id| self.volunteers.iter_mut().find(|v| v.id == *id))
        {
            volunteer.available = true;
        }
        info!(task = %task_id, volunteer = ?freed, "Task completed");
        Ok(self.assign_pending())
    }

    /// Give every pending task that has a qualifying volunteer to that
    /// volunteer. Returns one `assignment` message per assignment.
    fn assign_pending(&mut self) -> Vec<Message> {
        let mut order: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == TaskStatus::Pending)
            .map(|(index, _)| index)
            .collect();
        // Stable sort keeps creation order among equal urgencies.
        order.sort_by_key(|&index| {
            core::cmp::Reverse(self.tasks.get(index).map(|t| t.urgency))
        });

        let mut outgoing = Vec::new();
        for index in order {
            let Some(task) = self.tasks.get_mut(index) else {
                continue;
            };
            let Some(volunteer) = self
                .volunteers
                .iter_mut()
                .find(|v| v.available && v.skills.contains(&task.required_skill))
            else {
                let waiting = AgentError::NoAvailableVolunteer {
                    task_id: task.id,
                    skill: task.required_skill,
                };
                debug!(error = %waiting, "Task stays pending");
                continue;
            };

            volunteer.available = false;
            task.status = TaskStatus::Assigned;
            task.assignee = Some(volunteer.id.clone());
            info!(
                task = %task.id,
                volunteer = %volunteer.id,
                area = %task.area_name,
                "Task assigned"
            );
            outgoing.push(Message::new(
                Topic::Assignment,
                self.id.clone(),
                Payload::Assignment(AssignmentNotice {
                    task_id: task.id,
                    volunteer_id: volunteer.id.clone(),
                    area_name: task.area_name.clone(),
                    resource: task.resource,
                    quantity: task.quantity,
                    urgency: task.urgency,
                }),
            ));
        }
        outgoing
    }
}

impl Subscriber for VolunteerCoordinator {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
        let result = match message.payload() {
            Payload::VolunteerRegistered {
                volunteer_id,
                skills,
            } => Ok(self.register(volunteer_id, skills)),
            Payload::AllocationPlan(plan) => Ok(self.add_plan(plan)),
            Payload::TaskCompleted { task_id } => self.complete(*task_id),
            other => Err(AgentError::UnexpectedPayload {
                topic: message.topic().clone(),
                actual: other.kind(),
            }),
        };
        result.map_err(|e| e.into_delivery(&self.id, message.topic()))
    }
}
