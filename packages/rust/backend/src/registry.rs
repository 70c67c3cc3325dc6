//! Backend registry (C3).
//!
//! Shape grounded on the teacher's `AdapterRegistry` (a `Vec<Box<dyn
//! Trait>>` held in priority/registration order with a single dispatch
//! method) — here generalized from content-extraction adapters to fetch
//! backends, and made idempotent on re-registration per §4.3.

use std::sync::Arc;

use crate::backend::FetchBackend;
use crate::criteria::BackendCriteria;

struct Registration {
    name: String,
    backend: Arc<dyn FetchBackend>,
    criteria: BackendCriteria,
}

/// Holds registered `(name, backend, criteria)` triples in registration
/// order. Read-mostly; registration is the only exclusive operation (§5).
#[derive(Default)]
pub struct BackendRegistry {
    entries: Vec<Registration>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a backend under `name`. Idempotent: re-registering the same
    /// name replaces the existing entry in place (keeping its registration
    /// slot) rather than appending a duplicate, and logs the replacement.
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn FetchBackend>, criteria: BackendCriteria) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == name) {
            tracing::info!(backend = %name, "replacing previously registered backend");
            existing.backend = backend;
            existing.criteria = criteria;
        } else {
            tracing::info!(backend = %name, "registered backend");
            self.entries.push(Registration { name, backend, criteria });
        }
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, &Arc<dyn FetchBackend>, &BackendCriteria)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), &e.backend, &e.criteria))
    }

    /// Look up a backend directly by registration name, bypassing scoring.
    /// Used by the `file:` scheme branch of the fetch pipeline, which
    /// skips the selector entirely (§4.7).
    pub fn get(&self, name: &str) -> Option<Arc<dyn FetchBackend>> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.backend.clone())
    }

    /// Invoke `close()` on each backend in registration-reverse order,
    /// swallowing individual errors into a combined report rather than
    /// aborting partway through shutdown.
    pub async fn close_all(&self) -> Result<(), String> {
        let mut errors = Vec::new();
        for entry in self.entries.iter().rev() {
            if let Err(e) = entry.backend.close().await {
                errors.push(format!("{}: {e}", entry.name));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }
}
