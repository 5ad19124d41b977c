//! Ordered `beforeSend` hook chain.
//!
//! Mirrors how the host runs its delivery callbacks: hooks run in
//! registration order and the chain stops at the first hook that leaves the
//! report ignored.

use crate::application::ports::BeforeSend;
use crate::domain::report::ErrorReport;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Runs `beforeSend` hooks against outbound reports.
pub struct SendPipeline<M = Value> {
    hooks: Vec<Arc<dyn BeforeSend<M>>>,
}

impl<M> SendPipeline<M> {
    /// Create an empty pipeline. An empty pipeline delivers everything.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook.
    pub fn push<H>(&mut self, hook: H)
    where
        H: BeforeSend<M> + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    /// Append a shared hook, keeping a handle to it outside the pipeline.
    pub fn push_shared(&mut self, hook: Arc<dyn BeforeSend<M>>) {
        self.hooks.push(hook);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: BeforeSend<M> + 'static,
    {
        self.push(hook);
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run the hooks and report whether the report should be delivered.
    ///
    /// A report that arrives already ignored is not shown to any hook.
    pub fn run(&self, report: &mut ErrorReport<M>) -> bool {
        for hook in &self.hooks {
            if report.is_ignored() {
                break;
            }
            hook.before_send(report);
        }

        let deliver = !report.is_ignored();
        if !deliver {
            tracing::trace!("Report ignored by beforeSend hook; not delivering");
        }
        deliver
    }
}

impl<M> Default for SendPipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for SendPipeline<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendPipeline")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
