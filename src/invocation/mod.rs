/*!
 * Function invocation.
 *
 * Entry points call each other by name through a `FunctionInvoker`:
 * - `LocalInvoker` routes to handlers registered in this process; handlers
 *   hold a `WeakInvoker` back into it
 * - `HttpInvoker` POSTs the event to `{base_url}/{function}`
 */

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::InvocationError;
use crate::handlers::ResponseEnvelope;

pub mod http;
pub mod local;

pub use http::HttpInvoker;
pub use local::{LocalInvoker, WeakInvoker};

/// A named function taking a JSON event and answering with an envelope.
///
/// Handlers never fail at this level; errors are already folded into the
/// envelope's status code.
#[async_trait]
pub trait EntryPoint: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, event: Value) -> ResponseEnvelope;
}

/// Synchronous request/response call to another function.
#[async_trait]
pub trait FunctionInvoker: Send + Sync + std::fmt::Debug {
    async fn invoke(&self, function: &str, payload: Value) -> Result<ResponseEnvelope, InvocationError>;
}

/// Shared handle to an invoker.
pub type SharedInvoker = Arc<dyn FunctionInvoker>;
