//! # Handler Registry
//!
//! Ordered table of callback handlers, assembled once at startup and frozen.
//!
//! ## Overview
//!
//! Predicates may inspect case data as well as phase and event kind, so the
//! registry cannot be keyed by event. [`HandlerRegistry::lookup`] evaluates
//! every predicate and returns matches ordered by [`DispatchPriority`], then
//! by registration order. With uniform priorities the result is exactly
//! registration order.
//!
//! ```text
//! HandlerRegistryBuilder::register(h1) ─┐
//! HandlerRegistryBuilder::register(h2) ─┼─> build() ─> HandlerRegistry (immutable)
//! HandlerRegistryBuilder::register(h3) ─┘
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::handler::{CallbackHandler, DispatchPriority, HandlerDescriptor};
use crate::callback::{CallbackPhase, CaseData, EventKind};
use crate::logging::log_registry_operation;

/// Registration failures, all detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Handler name must not be empty")]
    EmptyHandlerName,

    #[error("Handler already registered: {name}")]
    DuplicateHandler { name: String },
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_handlers: usize,
    pub handlers_by_priority: BTreeMap<DispatchPriority, usize>,
}

/// Collects handler registrations before the registry is frozen
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    descriptors: Vec<HandlerDescriptor>,
    names: HashSet<String>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Registration order is the tie-break within a priority band.
    pub fn register<H>(&mut self, handler: H) -> Result<&mut Self, RegistryError>
    where
        H: CallbackHandler + 'static,
    {
        self.register_arc(Arc::new(handler))
    }

    pub fn register_arc(&mut self, handler: Arc<dyn CallbackHandler>) -> Result<&mut Self, RegistryError> {
        let name = handler.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyHandlerName);
        }
        if !self.names.insert(name.clone()) {
            log_registry_operation("register", Some(&name), None, "rejected", Some("duplicate name"));
            return Err(RegistryError::DuplicateHandler { name });
        }

        let priority = handler.priority();
        let sequence = self.descriptors.len();
        self.descriptors.push(HandlerDescriptor {
            sequence,
            priority,
            handler,
        });

        log_registry_operation(
            "register",
            Some(&name),
            Some(&priority.to_string()),
            "registered",
            None,
        );
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registry. Descriptors are pre-sorted so lookups preserve order by filtering.
    pub fn build(self) -> HandlerRegistry {
        let mut descriptors = self.descriptors;
        descriptors.sort_by_key(|d| (d.priority, d.sequence));

        log_registry_operation(
            "build",
            None,
            None,
            "frozen",
            Some(&format!("{} handlers", descriptors.len())),
        );

        HandlerRegistry { descriptors }
    }
}

/// Immutable, ordered set of callback handlers
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    descriptors: Vec<HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    /// All handlers whose predicate accepts the callback, in dispatch order
    pub fn lookup(
        &self,
        phase: CallbackPhase,
        event_kind: &EventKind,
        snapshot: &CaseData,
    ) -> Vec<&HandlerDescriptor> {
        let matches: Vec<&HandlerDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| d.matches(phase, event_kind, snapshot))
            .collect();

        debug!(
            phase = %phase,
            event_kind = %event_kind,
            matched = matches.len(),
            handlers = ?matches.iter().map(|d| d.name()).collect::<Vec<_>>(),
            "Registry lookup"
        );
        matches
    }

    /// Handlers in dispatch order
    pub fn descriptors(&self) -> &[HandlerDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut handlers_by_priority = BTreeMap::new();
        for descriptor in &self.descriptors {
            *handlers_by_priority.entry(descriptor.priority).or_insert(0) += 1;
        }
        RegistryStats {
            total_handlers: self.descriptors.len(),
            handlers_by_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::HandlerResult;
    use crate::registry::handler::FnHandler;
    use serde_json::json;

    fn passthrough(name: &str, event: &str) -> FnHandler {
        FnHandler::for_event(name, CallbackPhase::AboutToSubmit, event, |ctx| {
            Ok(HandlerResult::new(ctx.current().clone()))
        })
    }

    fn names(found: &[&HandlerDescriptor]) -> Vec<String> {
        found.iter().map(|d| d.name().to_string()).collect()
    }

    #[test]
    fn test_lookup_preserves_registration_order() {
        let mut builder = HandlerRegistry::builder();
        builder
            .register(passthrough("first", "readyToList"))
            .unwrap()
            .register(passthrough("other", "appealReceived"))
            .unwrap()
            .register(passthrough("second", "readyToList"))
            .unwrap();
        let registry = builder.build();

        let found = registry.lookup(CallbackPhase::AboutToSubmit, &"readyToList".into(), &CaseData::new());
        assert_eq!(names(&found), vec!["first", "second"]);
    }

    #[test]
    fn test_priority_bands_then_registration_order() {
        let mut builder = HandlerRegistry::builder();
        builder
            .register(passthrough("late_a", "e"))
            .unwrap()
            .register(passthrough("earliest", "e").with_priority(DispatchPriority::Earliest))
            .unwrap()
            .register(passthrough("late_b", "e"))
            .unwrap()
            .register(passthrough("latest", "e").with_priority(DispatchPriority::Latest))
            .unwrap();
        let registry = builder.build();

        let found = registry.lookup(CallbackPhase::AboutToSubmit, &"e".into(), &CaseData::new());
        assert_eq!(names(&found), vec!["earliest", "late_a", "late_b", "latest"]);
    }

    #[test]
    fn test_predicate_can_inspect_case_data() {
        let mut builder = HandlerRegistry::builder();
        builder
            .register(FnHandler::new(
                "gaps_only",
                |_, _, data| data.get("hearingRoute") == Some(&json!("gaps")),
                |ctx| Ok(HandlerResult::new(ctx.current().clone())),
            ))
            .unwrap();
        let registry = builder.build();

        let gaps = json!({"hearingRoute": "gaps"}).as_object().cloned().unwrap();
        let event = EventKind::from("anything");
        assert_eq!(registry.lookup(CallbackPhase::MidEvent, &event, &gaps).len(), 1);
        assert!(registry.lookup(CallbackPhase::MidEvent, &event, &CaseData::new()).is_empty());
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let mut builder = HandlerRegistry::builder();
        builder.register(passthrough("h", "e")).unwrap();
        assert_eq!(
            builder.register(passthrough("h", "e")).err(),
            Some(RegistryError::DuplicateHandler { name: "h".into() })
        );
        assert_eq!(
            builder.register(passthrough("  ", "e")).err(),
            Some(RegistryError::EmptyHandlerName)
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut builder = HandlerRegistry::builder();
        builder
            .register(passthrough("a", "e"))
            .unwrap()
            .register(passthrough("b", "e").with_priority(DispatchPriority::Early))
            .unwrap();
        let stats = builder.build().stats();
        assert_eq!(stats.total_handlers, 2);
        assert_eq!(stats.handlers_by_priority.get(&DispatchPriority::Early), Some(&1));
        assert_eq!(stats.handlers_by_priority.get(&DispatchPriority::Late), Some(&1));
    }
}
