//! Communication agent: victim intake, rescue team tracking, alert relay.
//!
//! A victim request is escalated on `rescue_needed` as soon as it arrives,
//! with its urgency raised by proximity to the nearest rescue team. Requests
//! that arrive before any team is known stay open and are dispatched when the
//! next team position report comes in. Alerts from analytics (or any custom
//! `*_alert` topic) are relayed unchanged on `alerts`.

use std::collections::BTreeMap;

use relief_broker::{DeliveryError, Subscriber};
use relief_types::{
    AgentId, Alert, GeoPoint, Message, Payload, RescueDispatch, TeamId, Topic, Urgency,
    VictimRequest, VictimRequestId, VictimStatus,
};
use relief_world::geo::nearest;
use tracing::{debug, info};

use crate::config::CommunicationConfig;
use crate::error::AgentError;

/// Number of distance bands the proximity boost spans.
const BOOST_BANDS: u8 = 10;

/// Urgency a victim earns from being close to a rescue team.
///
/// Within `k` bands of `step_km` the boost is `10 - k`; ten or more bands
/// away (or an unusable distance) it is zero.
pub fn proximity_boost(distance_km: f64, step_km: u32) -> Urgency {
    let step = f64::from(step_km.max(1));
    let boost = (0..=BOOST_BANDS)
        .find(|bands| distance_km <= f64::from(*bands) * step)
        .map_or(0, |bands| BOOST_BANDS.saturating_sub(bands));
    Urgency::saturating(i64::from(boost))
}

/// Tracks victims and rescue teams and relays alerts.
#[derive(Debug)]
pub struct CommunicationAgent {
    id: AgentId,
    config: CommunicationConfig,
    teams: BTreeMap<TeamId, GeoPoint>,
    /// Arrival order.
    requests: Vec<VictimRequest>,
}

impl CommunicationAgent {
    /// Create an agent with no known teams or requests.
    pub fn new(config: CommunicationConfig) -> Self {
        Self {
            id: AgentId::communication(),
            config,
            teams: BTreeMap::new(),
            requests: Vec::new(),
        }
    }

    /// Victim requests in arrival order.
    pub fn requests(&self) -> &[VictimRequest] {
        &self.requests
    }

    /// Last reported position of every team.
    pub const fn teams(&self) -> &BTreeMap<TeamId, GeoPoint> {
        &self.teams
    }

    /// Record a victim request and escalate it on `rescue_needed`.
    pub fn intake(
        &mut self,
        location: GeoPoint,
        description: &str,
        reported_urgency: Urgency,
    ) -> Vec<Message> {
        let mut request = VictimRequest {
            id: VictimRequestId::new(),
            location,
            description: description.to_owned(),
            reported_urgency,
            effective_urgency: reported_urgency,
            status: VictimStatus::Open,
        };
        let team = self.route(&mut request);
        info!(
            request = %request.id,
            reported = %request.reported_urgency,
            effective = %request.effective_urgency,
            team = ?team,
            "Victim request received"
        );
        let message = self.rescue_needed(&request, team);
        self.requests.push(request);
        vec![message]
    }

    /// Record a team position, then dispatch every open request.
    ///
    /// Dispatches are published by descending effective urgency, ties in
    /// arrival order.
    pub fn update_team(&mut self, team_id: &TeamId, location: GeoPoint) -> Vec<Message> {
        self.teams.insert(team_id.clone(), location);
        debug!(team = %team_id, lat = location.lat, lon = location.lon, "Team location updated");

        let mut routed: Vec<(usize, VictimRequest, Option<TeamId>)> = self
            .requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status == VictimStatus::Open)
            .map(|(index, r)| {
                let mut request = r.clone();
                let team = self.route(&mut request);
                (index, request, team)
            })
            .collect();
        routed.sort_by_key(|(_, request, _)| core::cmp::Reverse(request.effective_urgency));

        let mut outgoing = Vec::with_capacity(routed.len());
        for (index, request, team) in routed {
            info!(
                request = %request.id,
                effective = %request.effective_urgency,
                team = ?team,
                "Open victim request dispatched"
            );
            outgoing.push(self.rescue_needed(&request, team));
            if let Some(slot) = self.requests.get_mut(index) {
                *slot = request;
            }
        }
        outgoing
    }

    /// Republish an alert on `alerts`.
    pub fn relay(&self, alert: &Alert, source: &Topic) -> Vec<Message> {
        info!(
            kind = %alert.kind,
            severity = %alert.severity,
            source = %source,
            "Alert relayed"
        );
        vec![Message::new(
            Topic::Alerts,
            self.id.clone(),
            Payload::Alert(alert.clone()),
        )]
    }

    /// Apply the proximity boost and pick the nearest team, if any.
    fn route(&self, request: &mut VictimRequest) -> Option<TeamId> {
        let (team, distance) = nearest(
            request.location,
            self.teams.iter().map(|(id, location)| (id, *location)),
        )?;
        let boost = proximity_boost(distance, self.config.boost_step_km);
        request.effective_urgency = request.reported_urgency.max(boost);
        request.status = VictimStatus::Dispatched { team: team.clone() };
        Some(team.clone())
    }

    fn rescue_needed(&self, request: &VictimRequest, team: Option<TeamId>) -> Message {
        Message::new(
            Topic::RescueNeeded,
            self.id.clone(),
            Payload::RescueNeeded(RescueDispatch {
                request_id: request.id,
                location: request.location,
                description: request.description.clone(),
                effective_urgency: request.effective_urgency,
                team,
            }),
        )
    }
}

impl Subscriber for CommunicationAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
        let result = match message.payload() {
            Payload::VictimRequest {
                location,
                description,
                reported_urgency,
            } => Ok(self.intake(*location, description, *reported_urgency)),
            Payload::RescueTeamLocation { team_id, location } => {
                Ok(self.update_team(team_id, *location))
            }
            Payload::Alert(alert) if message.topic().is_alert_source() => {
                Ok(self.relay(alert, message.topic()))
            }
            // Already on the general channel.
            Payload::Alert(_) => Ok(Vec::new()),
            other => Err(AgentError::UnexpectedPayload {
                topic: message.topic().clone(),
                actual: other.kind(),
            }),
        };
        result.map_err(|e| e.into_delivery(&self.id, message.topic()))
    }
}
