//! The message broker.
//!
//! # Delivery semantics
//!
//! - `publish` validates the message (payload kind must match the topic) and
//!   drops it with a warning if it does not.
//! - The subscriber list is snapshotted at publish time; the message goes to
//!   each subscriber in subscription order, at most once.
//! - A subscriber error is logged and skipped. The rest still receive the
//!   message.
//! - Once every subscriber has seen the message, the messages they returned
//!   are published in emission order, depth-first, before `publish` returns.
//!   A top-level publish therefore completes its whole reaction cascade.
//! - Nothing is queued, retried, persisted or replayed.
//!
//! # Locking
//!
//! The subscription table and the journal each sit behind their own mutex and
//! are never held while a subscriber runs. Each subscriber has its own mutex
//! (see [`SharedSubscriber`]), so concurrent publishes serialize per agent
//! and a reaction may publish without deadlocking.

use std::collections::BTreeMap;
use std::sync::Mutex;

use relief_types::{AgentId, Message, Topic};
use tracing::{debug, info, warn};

use crate::error::{BrokerError, DeliveryError};
use crate::journal::Journal;
use crate::subscriber::SharedSubscriber;

/// Default bound on reaction chain length.
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 32;

/// Default number of messages kept in the journal.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 1024;

/// Tunables for the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Longest reaction chain allowed below a top-level publish (default: 32).
    pub max_cascade_depth: usize,
    /// Messages retained in the journal (default: 1024, 0 disables).
    pub journal_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

/// Outcome of one top-level publish, cascade included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Successful deliveries (one per subscriber per message).
    pub delivered: usize,
    /// Messages published as reactions.
    pub cascaded: usize,
    /// Reaction messages dropped by validation or the depth bound.
    pub rejected: usize,
    /// Isolated subscriber failures.
    pub failures: Vec<DeliveryError>,
}

/// One registration in the subscription table.
#[derive(Clone)]
struct Subscription {
    agent: AgentId,
    handle: SharedSubscriber,
}

/// Topic-keyed publish/subscribe hub with synchronous delivery.
pub struct MessageBroker {
    config: BrokerConfig,
    subscriptions: Mutex<BTreeMap<Topic, Vec<Subscription>>>,
    journal: Mutex<Journal>,
}

impl MessageBroker {
    /// Create a broker with default configuration.
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Create a broker with explicit configuration.
    pub fn with_config(config: BrokerConfig) -> Self {
        let journal = Journal::new(config.journal_capacity);
        Self {
            config,
            subscriptions: Mutex::new(BTreeMap::new()),
            journal: Mutex::new(journal),
        }
    }

    /// Register `handle` as a listener on `topic`.
    ///
    /// Idempotent per (topic, agent id): returns `false` if the agent was
    /// already subscribed, leaving its original position untouched.
    pub fn subscribe(&self, topic: Topic, handle: SharedSubscriber) -> Result<bool, BrokerError> {
        let agent = handle
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("subscriber"))?
            .id()
            .clone();
        let mut table = self
            .subscriptions
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("subscriptions"))?;
        let listeners = table.entry(topic.clone()).or_default();
        if listeners.iter().any(|s| s.agent == agent) {
            debug!(topic = %topic, agent = %agent, "Already subscribed");
            return Ok(false);
        }
        listeners.push(Subscription {
            agent: agent.clone(),
            handle,
        });
        debug!(topic = %topic, agent = %agent, "Subscribed");
        Ok(true)
    }

    /// Remove `agent` from `topic`. Returns whether it was subscribed.
    pub fn unsubscribe(&self, topic: &Topic, agent: &AgentId) -> Result<bool, BrokerError> {
        let mut table = self
            .subscriptions
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("subscriptions"))?;
        let Some(listeners) = table.get_mut(topic) else {
            return Ok(false);
        };
        let before = listeners.len();
        listeners.retain(|s| s.agent != *agent);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            table.remove(topic);
        }
        if removed {
            debug!(topic = %topic, agent = %agent, "Unsubscribed");
        }
        Ok(removed)
    }

    /// Agents currently subscribed to `topic`, in subscription order.
    pub fn subscribers(&self, topic: &Topic) -> Result<Vec<AgentId>, BrokerError> {
        let table = self
            .subscriptions
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("subscriptions"))?;
        Ok(table
            .get(topic)
            .map(|listeners| listeners.iter().map(|s| s.agent.clone()).collect())
            .unwrap_or_default())
    }

    /// Publish a message and its full reaction cascade.
    ///
    /// Returns an error only when the top-level message itself is rejected.
    /// Subscriber failures and rejected reactions are reported in the
    /// [`PublishReport`].
    pub fn publish(&self, message: Message) -> Result<PublishReport, BrokerError> {
        let mut report = PublishReport::default();
        let topic = message.topic().clone();
        let sender = message.sender().clone();
        self.dispatch(message, 0, &mut report)?;
        info!(
            topic = %topic,
            sender = %sender,
            delivered = report.delivered,
            cascaded = report.cascaded,
            rejected = report.rejected,
            failures = report.failures.len(),
            "Publish complete"
        );
        Ok(report)
    }

    /// Copy of every retained journal entry, oldest first.
    pub fn journal(&self) -> Result<Vec<Message>, BrokerError> {
        Ok(self
            .journal
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("journal"))?
            .messages())
    }

    /// Retained journal entries on one topic, oldest first.
    pub fn journal_on(&self, topic: &Topic) -> Result<Vec<Message>, BrokerError> {
        Ok(self
            .journal
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("journal"))?
            .on_topic(topic))
    }

    /// Broker configuration.
    pub const fn config(&self) -> &BrokerConfig {
        &self.config
    }

    fn dispatch(
        &self,
        message: Message,
        depth: usize,
        report: &mut PublishReport,
    ) -> Result<(), BrokerError> {
        if depth > self.config.max_cascade_depth {
            warn!(
                topic = %message.topic(),
                sender = %message.sender(),
                depth = depth,
                "Cascade too deep, dropping message"
            );
            return Err(BrokerError::CascadeTooDeep {
                depth,
                topic: message.topic().clone(),
            });
        }

        if let Err(source) = message.validate() {
            warn!(
                topic = %message.topic(),
                sender = %message.sender(),
                error = %source,
                "Dropping invalid message"
            );
            return Err(source.into());
        }

        let listeners = self.listeners_of(message.topic())?;
        if listeners.is_empty() {
            debug!(topic = %message.topic(), "No subscribers");
            self.record(message)?;
            return Ok(());
        }

        let mut emitted = Vec::new();
        for subscription in &listeners {
            match deliver_one(subscription, &message) {
                Ok(reactions) => {
                    report.delivered = report.delivered.saturating_add(1);
                    debug!(
                        topic = %message.topic(),
                        agent = %subscription.agent,
                        reactions = reactions.len(),
                        "Delivered"
                    );
                    emitted.extend(reactions);
                }
                Err(failure) => {
                    warn!(
                        topic = %message.topic(),
                        agent = %subscription.agent,
                        error = %failure,
                        "Subscriber failed, continuing delivery"
                    );
                    report.failures.push(failure);
                }
            }
        }

        self.record(message)?;

        let next_depth = depth.saturating_add(1);
        for reaction in emitted {
            report.cascaded = report.cascaded.saturating_add(1);
            match self.dispatch(reaction, next_depth, report) {
                Ok(()) => {}
                Err(BrokerError::LockPoisoned(which)) => {
                    return Err(BrokerError::LockPoisoned(which));
                }
                Err(_dropped) => {
                    report.rejected = report.rejected.saturating_add(1);
                }
            }
        }
        Ok(())
    }

    fn record(&self, message: Message) -> Result<(), BrokerError> {
        self.journal
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("journal"))?
            .push(message);
        Ok(())
    }

    fn listeners_of(&self, topic: &Topic) -> Result<Vec<Subscription>, BrokerError> {
        let table = self
            .subscriptions
            .lock()
            .map_err(|_poisoned| BrokerError::LockPoisoned("subscriptions"))?;
        Ok(table.get(topic).cloned().unwrap_or_default())
    }
}

impl Default for MessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.subscriptions.lock().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("MessageBroker")
            .field("config", &self.config)
            .field("topics", &topics)
            .finish_non_exhaustive()
    }
}

fn deliver_one(subscription: &Subscription, message: &Message) -> Result<Vec<Message>, DeliveryError> {
    let mut subscriber = subscription
        .handle
        .lock()
        .map_err(|_poisoned| DeliveryError::Poisoned(subscription.agent.clone()))?;
    subscriber.deliver(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use relief_types::{Alert, Payload, RiskLevel, TaskId};

    use super::*;
    use crate::subscriber::{Subscriber, shared};

    /// Records every message it receives.
    struct Recorder {
        id: AgentId,
        seen: Vec<Message>,
    }

    impl Recorder {
        fn new(name: &str) -> Self {
            Self {
                id: AgentId::new(name),
                seen: Vec::new(),
            }
        }
    }

    impl Subscriber for Recorder {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
            self.seen.push(message.clone());
            Ok(Vec::new())
        }
    }

    /// Fails on every message.
    struct Failing {
        id: AgentId,
    }

    impl Subscriber for Failing {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
            Err(DeliveryError::rejected(&self.id, message.topic(), "boom"))
        }
    }

    /// Relays every alert it sees to `alerts`.
    struct Relay {
        id: AgentId,
    }

    impl Subscriber for Relay {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
            Ok(vec![Message::new(
                Topic::Alerts,
                self.id.clone(),
                message.payload().clone(),
            )])
        }
    }

    /// Republishes on the topic it listens to, forever.
    struct Looper {
        id: AgentId,
    }

    impl Subscriber for Looper {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn deliver(&mut self, message: &Message) -> Result<Vec<Message>, DeliveryError> {
            Ok(vec![Message::new(
                message.topic().clone(),
                self.id.clone(),
                message.payload().clone(),
            )])
        }
    }

    /// Appends its own id to a shared list on every delivery.
    struct Ordered {
        id: AgentId,
        order: Arc<Mutex<Vec<String>>>,
    }

    impl Subscriber for Ordered {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn deliver(&mut self, _message: &Message) -> Result<Vec<Message>, DeliveryError> {
            if let Ok(mut order) = self.order.lock() {
                order.push(self.id.to_string());
            }
            Ok(Vec::new())
        }
    }

    fn alert_message(topic: Topic) -> Message {
        Message::new(
            topic,
            AgentId::analytics(),
            Payload::Alert(Alert {
                kind: "weather_impact".to_owned(),
                severity: RiskLevel::capped(8),
                message: "High risk detected: 8/10".to_owned(),
                areas_affected: Vec::new(),
                recommended_actions: Vec::new(),
            }),
        )
    }

    fn seen(recorder: &Arc<Mutex<Recorder>>) -> usize {
        recorder.lock().map(|r| r.seen.len()).unwrap_or(usize::MAX)
    }

    #[test]
    fn subscribe_is_idempotent_per_agent() {
        let broker = MessageBroker::new();
        let recorder = shared(Recorder::new("probe"));
        assert_eq!(broker.subscribe(Topic::Alerts, recorder.clone()).ok(), Some(true));
        assert_eq!(broker.subscribe(Topic::Alerts, recorder.clone()).ok(), Some(false));

        let report = broker.publish(alert_message(Topic::Alerts));
        assert_eq!(report.map(|r| r.delivered).ok(), Some(1));
        assert_eq!(seen(&recorder), 1);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let broker = MessageBroker::new();
        let report = broker.publish(alert_message(Topic::Alerts));
        assert_eq!(report.ok(), Some(PublishReport::default()));
    }

    #[test]
    fn delivery_follows_subscription_order() {
        let broker = MessageBroker::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["c", "a", "b"] {
            broker
                .subscribe(
                    Topic::Alerts,
                    shared(Ordered {
                        id: AgentId::new(name),
                        order: Arc::clone(&order),
                    }),
                )
                .unwrap();
        }
        broker.publish(alert_message(Topic::Alerts)).unwrap();

        let order = order.lock().unwrap().clone();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn failing_subscriber_is_isolated() {
        let broker = MessageBroker::new();
        let before = shared(Recorder::new("before"));
        let after = shared(Recorder::new("after"));
        broker.subscribe(Topic::Alerts, before.clone()).unwrap();
        broker
            .subscribe(
                Topic::Alerts,
                shared(Failing {
                    id: AgentId::new("failing"),
                }),
            )
            .unwrap();
        broker.subscribe(Topic::Alerts, after.clone()).unwrap();

        let report = broker.publish(alert_message(Topic::Alerts));
        assert!(report.is_ok());
        let report = report.unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(seen(&before), 1);
        assert_eq!(seen(&after), 1);
    }

    #[test]
    fn unsubscribed_agent_receives_nothing() {
        let broker = MessageBroker::new();
        let stays = shared(Recorder::new("stays"));
        let leaves = shared(Recorder::new("leaves"));
        let never = shared(Recorder::new("never"));
        broker.subscribe(Topic::Alerts, stays.clone()).unwrap();
        broker.subscribe(Topic::Alerts, leaves.clone()).unwrap();
        broker.subscribe(Topic::PredictionAlert, never.clone()).unwrap();

        assert_eq!(
            broker.unsubscribe(&Topic::Alerts, &AgentId::new("leaves")).ok(),
            Some(true)
        );
        broker.publish(alert_message(Topic::Alerts)).unwrap();

        assert_eq!(seen(&stays), 1);
        assert_eq!(seen(&leaves), 0);
        assert_eq!(seen(&never), 0);
    }

    #[test]
    fn reactions_cascade_before_publish_returns() {
        let broker = MessageBroker::new();
        let sink = shared(Recorder::new("sink"));
        broker
            .subscribe(
                Topic::PredictionAlert,
                shared(Relay {
                    id: AgentId::communication(),
                }),
            )
            .unwrap();
        broker.subscribe(Topic::Alerts, sink.clone()).unwrap();

        let report = broker.publish(alert_message(Topic::PredictionAlert));
        assert_eq!(report.as_ref().map(|r| r.cascaded).ok(), Some(1));
        assert_eq!(report.map(|r| r.delivered).ok(), Some(2));
        assert_eq!(seen(&sink), 1);
        assert_eq!(broker.journal().map(|j| j.len()).ok(), Some(2));
    }

    #[test]
    fn invalid_message_is_dropped() {
        let broker = MessageBroker::new();
        let sink = shared(Recorder::new("sink"));
        broker.subscribe(Topic::AllocationPlan, sink.clone()).unwrap();

        let wrong = Message::new(
            Topic::AllocationPlan,
            AgentId::driver(),
            Payload::TaskCompleted {
                task_id: TaskId::new(),
            },
        );
        let result = broker.publish(wrong);
        assert!(matches!(result, Err(BrokerError::Invalid { .. })));
        assert_eq!(seen(&sink), 0);
        assert_eq!(broker.journal().map(|j| j.len()).ok(), Some(0));
    }

    #[test]
    fn runaway_cascade_is_cut() {
        let broker = MessageBroker::with_config(BrokerConfig {
            max_cascade_depth: 3,
            journal_capacity: 16,
        });
        broker
            .subscribe(
                Topic::Alerts,
                shared(Looper {
                    id: AgentId::new("looper"),
                }),
            )
            .unwrap();

        let report = broker.publish(alert_message(Topic::Alerts));
        let report = report.unwrap();
        assert_eq!(report.delivered, 4);
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn timestamps_survive_delivery() {
        let broker = MessageBroker::new();
        let sink = shared(Recorder::new("sink"));
        broker.subscribe(Topic::Alerts, sink.clone()).unwrap();
        let message = alert_message(Topic::Alerts);
        let stamped = message.timestamp();
        broker.publish(message).unwrap();

        let received = sink
            .lock()
            .ok()
            .and_then(|r| r.seen.first().map(Message::timestamp));
        assert_eq!(received, Some(stamped));
        assert!(stamped <= chrono::Utc::now());
    }
}
