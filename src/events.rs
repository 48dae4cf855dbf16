use crate::data::types::{EventTypeId, FlowEvent, SubscriptionId};

/// Views the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Live feed of one event stream
    Stream(EventTypeId),
}

/// Events sent from background tasks to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Access node
    Connected { sealed_height: u64 },
    SealedHeight(u64),

    // Subscription
    SubscriptionStarted { subscription: SubscriptionId, start_height: u64 },
    Flow { subscription: SubscriptionId, event: Box<FlowEvent> },
    SubscriptionFailed { subscription: SubscriptionId, message: String },

    // Export
    Export { stream: EventTypeId, events: Vec<FlowEvent> },
    ExportComplete(String),

    // Status
    Error(String),
}
