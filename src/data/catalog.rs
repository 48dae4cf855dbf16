use crate::data::manifest::{Manifest, ManifestError};
use crate::data::types::{EventKind, EventTypeId};

/// The event identifiers of one deployed contract, built once at start-up.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    network: String,
    contract: String,
    ids: Vec<(EventKind, EventTypeId)>,
}

impl EventCatalog {
    pub fn new(manifest: &Manifest, network: &str, contract: &str) -> Result<Self, ManifestError> {
        let address = manifest.contract_address(contract, network)?;
        let ids = EventKind::ALL
            .into_iter()
            .map(|kind| (kind, EventTypeId::new(address, contract, kind.event_name())))
            .collect();

        Ok(Self {
            network: network.to_string(),
            contract: contract.to_string(),
            ids,
        })
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn id(&self, kind: EventKind) -> &EventTypeId {
        // ids holds every kind, in EventKind::ALL order
        &self.ids[kind as usize].1
    }

    pub fn kind_of(&self, event_type: &str) -> Option<EventKind> {
        self.ids
            .iter()
            .find(|(_, id)| id.as_str() == event_type)
            .map(|(kind, _)| *kind)
    }

    /// Resolve a stream selector: an event name, a tab number (1-based) or a full identifier.
    pub fn resolve(&self, selector: &str) -> Option<EventTypeId> {
        let selector = selector.trim();

        if let Ok(n) = selector.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| self.ids.get(i))
                .map(|(_, id)| id.clone());
        }

        if let Some(kind) = EventKind::from_event_name(selector) {
            return Some(self.id(kind).clone());
        }

        EventTypeId::parse(selector)
    }
}
