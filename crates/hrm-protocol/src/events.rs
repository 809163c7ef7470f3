//! Event dispatch for decoded readings.
//!
//! Listeners are plain closures registered on an [`EventDispatcher`]. Every
//! decoded frame produces exactly one [`HrmEvent`] of kind
//! [`HrmEventType::HeartRate`].

use crate::types::Reading;

/// Topics a monitor publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HrmEventType {
    /// A new heart-rate reading was decoded.
    HeartRate,
}

impl HrmEventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HrmEventType::HeartRate => "heart_rate",
        }
    }
}

impl std::fmt::Display for HrmEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HrmEvent {
    pub kind: HrmEventType,
    pub reading: Reading,
}

impl HrmEvent {
    /// A [`HrmEventType::HeartRate`] event carrying `reading`.
    pub fn heart_rate(reading: Reading) -> Self {
        HrmEvent {
            kind: HrmEventType::HeartRate,
            reading,
        }
    }
}

/// Handle returned by [`EventDispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Boxed listener callback.
pub type Listener = Box<dyn FnMut(&HrmEvent) + Send>;

/// Delivers events to zero or more listeners, in subscription order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every event notified after this call.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HrmEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Call every listener with `event`.
    pub fn notify(&mut self, event: &HrmEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
