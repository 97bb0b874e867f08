//! Relief coordinator: turns area assessments into resource allocations.
//!
//! On `assessment_ready` the coordinator ranks areas by
//! `urgency * severity weight` (descending, ties by area name ascending),
//! then walks each area's needs in resource order and takes
//! `min(requested, available)` from the pool on the spot. Every non-zero
//! allocation is committed as an [`AllocationPlan`] and published on
//! `allocation_plan`. A shortfall is logged and processing continues.
//! An area named more than once in a round is served once, with its last
//! assessment.

use std::collections::BTreeMap;
use std::sync::Arc;

use relief_broker::{DeliveryError, Subscriber};
use relief_types::{
    AgentId, AllocationPlan, AreaAssessment, Message, Payload, Priority, Severity, Topic,
};
use relief_world::DisasterContext;
use tracing::{debug, info, warn};

use crate::config::ReliefConfig;
use crate::error::AgentError;
use crate::pool::ResourcePool;

/// Owns the resource pool and the history of committed plans.
#[derive(Debug)]
pub struct ReliefCoordinator {
    id: AgentId,
    context: Arc<DisasterContext>,
    pool: ResourcePool,
    plans: Vec<AllocationPlan>,
}

impl ReliefCoordinator {
    /// Create a coordinator with the configured starting stock.
    pub fn new(context: Arc<DisasterContext>, config: &ReliefConfig) -> Self {
        Self {
            id: AgentId::relief_coordinator(),
            context,
            pool: ResourcePool::new(&config.initial_pool),
            plans: Vec::new(),
        }
    }

    /// The resource pool.
    pub const fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Every plan committed so far, in commit order.
    pub fn plans(&self) -> &[AllocationPlan] {
        &self.plans
    }

    /// Rank assessments and allocate stock to each area in turn.
    ///
    /// Returns one `allocation_plan` message per non-zero allocation.
    pub fn allocate(&mut self, assessments: &[AreaAssessment]) -> Result<Vec<Message>, AgentError> {
        let severity = self.context.severity().ok_or(AgentError::DisasterNotDeclared)?;
        let ranked = rank_areas(assessments, severity);

        let mut outgoing = Vec::new();
        for (priority, area) in ranked {
            for (&resource, &requested) in &area.needs {
                if requested == 0 {
                    continue;
                }
                let allocation = self.pool.allocate(resource, requested);
                if allocation.is_short() {
                    let shortfall = AgentError::InsufficientResources {
                        resource,
                        requested,
                        available: allocation.available_before,
                    };
                    warn!(
                        area = %area.area_name,
                        resource = %resource,
                        granted = allocation.granted,
                        error = %shortfall,
                        "Partial allocation"
                    );
                }
                if allocation.granted == 0 {
                    continue;
                }

                let plan = AllocationPlan {
                    area_name: area.area_name.clone(),
                    resource,
                    quantity: allocation.granted,
                    priority,
                };
                info!(
                    area = %plan.area_name,
                    resource = %plan.resource,
                    quantity = plan.quantity,
                    priority = %plan.priority,
                    remaining = self.pool.available(resource),
                    "Allocation committed"
                );
                outgoing.push(Message::new(
                    Topic::AllocationPlan,
                    self.id.clone(),
                    Payload::AllocationPlan(plan.clone()),
                ));
                self.plans.push(plan);
            }
        }

        debug!(
            areas = assessments.len(),
            plans = outgoing.len(),
            "Assessment round allocated"
        );
        Ok(outgoing)
    }
}

/// Order areas by descending priority, ties by ascending area name.
///
/// Duplicate area names collapse to the last assessment.
fn rank_areas(assessments: &[AreaAssessment], severity: Severity) -> Vec<(Priority, &AreaAssessment)> {
    let latest: BTreeMap<&str, &AreaAssessment> = assessments
        .iter()
        .map(|area| (area.area_name.as_str(), area))
        .collect();
    let mut ranked: Vec<(Priority, &AreaAssessment)> = latest
        .into_values()
        .map(|area| (Priority::of(area.urgency, severity), area))
        .collect();
    ranked.sort_by(|(pa, a), (pb, b)| pb.cmp(pa).then_with(|| a.area_name.cmp(&b.area_name)));
    ranked
}

impl Subscriber for ReliefCoordinator {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
        let result = match message.payload() {
            Payload::AssessmentReady { assessments } => self.allocate(assessments),
            other => Err(AgentError::UnexpectedPayload {
                topic: message.topic().clone(),
                actual: other.kind(),
            }),
        };
        result.map_err(|e| e.into_delivery(&self.id, message.topic()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use relief_types::{Resource, Urgency};

    use super::*;

    fn declared(scale: u8) -> Arc<DisasterContext> {
        let context = Arc::new(DisasterContext::new());
        let severity = Severity::from_scale(scale).unwrap();
        context.initialize("earthquake", "LA", severity).unwrap();
        context
    }

    fn area(name: &str, urgency: u8, needs: &[(Resource, u32)]) -> AreaAssessment {
        AreaAssessment {
            area_name: name.to_owned(),
            needs: needs.iter().copied().collect(),
            urgency: Urgency::new(urgency).unwrap(),
        }
    }

    fn plans_of(messages: &[Message]) -> Vec<AllocationPlan> {
        messages
            .iter()
            .filter_map(|m| match m.payload() {
                Payload::AllocationPlan(plan) => Some(plan.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_area_gets_requested_quantity() {
        let mut relief = ReliefCoordinator::new(declared(8), &ReliefConfig::default());
        let out = relief.allocate(&[area("LA_Area_1", 9, &[(Resource::Food, 500)])]);
        let plans = plans_of(&out.unwrap());

        assert_eq!(plans.len(), 1);
        let plan = plans.first();
        assert_eq!(plan.map(|p| p.quantity), Some(500));
        assert_eq!(plan.map(|p| p.resource), Some(Resource::Food));
        // Severity 8 is Severe, weight 4.
        assert_eq!(plan.map(|p| p.priority.value()), Some(36));
        assert_eq!(relief.pool().available(Resource::Food), 500);
    }

    #[test]
    fn areas_are_served_by_descending_urgency() {
        let mut relief = ReliefCoordinator::new(declared(5), &ReliefConfig::default());
        let out = relief.allocate(&[
            area("low", 2, &[(Resource::Water, 10)]),
            area("high", 9, &[(Resource::Water, 10)]),
            area("mid", 5, &[(Resource::Water, 10)]),
        ]);
        let order: Vec<String> = plans_of(&out.unwrap())
            .into_iter()
            .map(|p| p.area_name)
            .collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn ties_resolve_by_area_name() {
        let mut relief = ReliefCoordinator::new(declared(5), &ReliefConfig::default());
        let out = relief.allocate(&[
            area("b", 5, &[(Resource::Food, 1)]),
            area("a", 5, &[(Resource::Food, 1)]),
            area("c", 5, &[(Resource::Food, 1)]),
        ]);
        let order: Vec<String> = plans_of(&out.unwrap())
            .into_iter()
            .map(|p| p.area_name)
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn shortfall_is_partial_and_exhausted_stock_is_suppressed() {
        let config = ReliefConfig {
            initial_pool: BTreeMap::from([(Resource::ShelterKits, 30)]),
        };
        let mut relief = ReliefCoordinator::new(declared(9), &config);
        let out = relief.allocate(&[
            area("first", 9, &[(Resource::ShelterKits, 20)]),
            area("second", 8, &[(Resource::ShelterKits, 20)]),
            area("third", 7, &[(Resource::ShelterKits, 20)]),
        ]);
        let quantities: Vec<u32> = plans_of(&out.unwrap())
            .into_iter()
            .map(|p| p.quantity)
            .collect();
        assert_eq!(quantities, vec![20, 10]);
        assert_eq!(relief.pool().available(Resource::ShelterKits), 0);
        assert!(relief.pool().is_balanced());
        assert_eq!(relief.plans().len(), 2);
    }

    #[test]
    fn repeated_area_is_served_once_with_last_assessment() {
        let mut relief = ReliefCoordinator::new(declared(8), &ReliefConfig::default());
        let out = relief.allocate(&[
            area("LA_Area_1", 9, &[(Resource::Food, 300)]),
            area("LA_Area_2", 5, &[(Resource::Food, 10)]),
            area("LA_Area_1", 9, &[(Resource::Food, 400)]),
        ]);
        let plans: Vec<(String, u32)> = plans_of(&out.unwrap())
            .into_iter()
            .map(|p| (p.area_name, p.quantity))
            .collect();
        assert_eq!(
            plans,
            vec![("LA_Area_1".to_owned(), 400), ("LA_Area_2".to_owned(), 10)]
        );
        assert_eq!(relief.pool().allocated(Resource::Food), 410);
    }

    #[test]
    fn undeclared_disaster_is_rejected() {
        let mut relief =
            ReliefCoordinator::new(Arc::new(DisasterContext::new()), &ReliefConfig::default());
        let result = relief.allocate(&[area("x", 5, &[(Resource::Food, 1)])]);
        assert_eq!(result, Err(AgentError::DisasterNotDeclared));
        assert_eq!(relief.pool().allocated(Resource::Food), 0);
    }

    #[test]
    fn same_input_same_plan_sequence() {
        let input = [
            area("north", 7, &[(Resource::Food, 600), (Resource::Water, 100)]),
            area("south", 7, &[(Resource::Food, 600)]),
            area("east", 3, &[(Resource::MedicalSupplies, 50)]),
        ];
        let mut first = ReliefCoordinator::new(declared(6), &ReliefConfig::default());
        let mut second = ReliefCoordinator::new(declared(6), &ReliefConfig::default());
        first.allocate(&input).unwrap();
        second.allocate(&input).unwrap();
        assert_eq!(first.plans(), second.plans());
    }

    #[test]
    fn wrong_payload_is_a_delivery_error() {
        let mut relief = ReliefCoordinator::new(declared(5), &ReliefConfig::default());
        let message = Message::new(
            Topic::TaskCompleted,
            AgentId::driver(),
            Payload::TaskCompleted {
                task_id: relief_types::TaskId::new(),
            },
        );
        assert!(relief.deliver(&message).is_err());
    }
}
