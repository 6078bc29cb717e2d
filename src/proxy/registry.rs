//! Per-method modifier chains.
//!
//! [`ModifierRegistry`] maps each [`HttpMethod`] to the ordered list of
//! modifiers registered for it. Chains are append-only and registration
//! order is execution order. The registry is built once, then shared
//! read-only behind an `Arc` by the forwarding engine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::UnsupportedMethodError;

use super::message::HttpMethod;
use super::modifier::Modifier;

pub type ModifierChain = Vec<Arc<dyn Modifier>>;

#[derive(Default)]
pub struct ModifierRegistry {
    chains: HashMap<HttpMethod, ModifierChain>,
}

impl ModifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `modifier` to the chain of every method in `methods`.
    ///
    /// Fails without registering anything if any of the methods is
    /// reserved (TRACE or CONNECT).
    pub fn register(
        &mut self,
        modifier: Arc<dyn Modifier>,
        methods: &[HttpMethod],
    ) -> Result<(), UnsupportedMethodError> {
        if let Some(&method) = methods.iter().find(|m| !m.is_proxyable()) {
            return Err(UnsupportedMethodError { method });
        }

        for &method in methods {
            self.chains
                .entry(method)
                .or_default()
                .push(Arc::clone(&modifier));
        }
        Ok(())
    }

    /// The chain for `method`, empty when nothing was registered.
    #[must_use]
    pub fn lookup(&self, method: HttpMethod) -> &[Arc<dyn Modifier>] {
        self.chains.get(&method).map(Vec::as_slice).unwrap_or_default()
    }

    /// Methods with at least one modifier, in declaration order.
    #[must_use]
    pub fn methods(&self) -> Vec<HttpMethod> {
        let mut methods: Vec<_> = self
            .chains
            .iter()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(method, _)| *method)
            .collect();
        methods.sort_unstable();
        methods
    }

    /// Total number of (modifier, method) registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for method in self.methods() {
            let names: Vec<&str> = self.lookup(method).iter().map(|m| m.name()).collect();
            map.entry(&method, &names);
        }
        map.finish()
    }
}
