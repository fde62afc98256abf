use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;

use super::{EntryPoint, FunctionInvoker};
use crate::errors::InvocationError;
use crate::handlers::ResponseEnvelope;

type FunctionTable = RwLock<HashMap<String, Arc<dyn EntryPoint>>>;

/// In-process routing table of entry points.
///
/// Clones share the table, so a handler may hold an invoker that later gets
/// more functions registered (the evaluator calls the model function and is
/// itself called by the converter). Registered handlers should hold a
/// `WeakInvoker` instead of a clone, or the table keeps itself alive.
#[derive(Clone, Default)]
pub struct LocalInvoker {
    functions: Arc<FunctionTable>,
}

/// Non-owning handle to a `LocalInvoker` table.
#[derive(Clone)]
pub struct WeakInvoker {
    functions: Weak<FunctionTable>,
}

impl WeakInvoker {
    /// The table, if its owner is still alive.
    pub fn upgrade(&self) -> Option<LocalInvoker> {
        self.functions.upgrade().map(|functions| LocalInvoker { functions })
    }
}

impl std::fmt::Debug for WeakInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakInvoker")
            .field("alive", &(self.functions.strong_count() > 0))
            .finish()
    }
}

#[async_trait]
impl FunctionInvoker for WeakInvoker {
    async fn invoke(&self, function: &str, payload: Value) -> Result<ResponseEnvelope, InvocationError> {
        let invoker = self.upgrade().ok_or_else(|| {
            InvocationError::Transport(format!("In-process functions are gone; cannot call '{}'", function))
        })?;
        invoker.invoke(function, payload).await
    }
}

impl LocalInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that routes through this table without keeping it alive.
    pub fn downgrade(&self) -> WeakInvoker {
        WeakInvoker {
            functions: Arc::downgrade(&self.functions),
        }
    }

    /// Register an entry point under its own name, replacing any previous one.
    pub fn register(&self, entry_point: Arc<dyn EntryPoint>) {
        let name = entry_point.name().to_string();
        debug!("Registering entry point '{}'", name);
        self.functions.write().insert(name, entry_point);
    }

    /// Register an entry point under an explicit name.
    pub fn register_as(&self, name: &str, entry_point: Arc<dyn EntryPoint>) {
        self.functions.write().insert(name.to_string(), entry_point);
    }

    pub fn contains(&self, function: &str) -> bool {
        self.functions.read().contains_key(function)
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for LocalInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalInvoker")
            .field("functions", &self.function_names())
            .finish()
    }
}

#[async_trait]
impl FunctionInvoker for LocalInvoker {
    async fn invoke(&self, function: &str, payload: Value) -> Result<ResponseEnvelope, InvocationError> {
        // Clone the handle out so the lock is not held across the call
        let entry_point = self
            .functions
            .read()
            .get(function)
            .cloned()
            .ok_or_else(|| InvocationError::UnknownFunction(function.to_string()))?;

        debug!("Invoking '{}' in process", function);
        Ok(entry_point.handle(payload).await)
    }
}
