//! Command Lifecycle Hook
//!
//! Implements the four-method hook shape Redis drivers invoke around
//! command execution. Each before-call opens an OpenTelemetry span (child
//! of whatever span the incoming context carries) tagged with a bounded
//! serialization of the command(s); each after-call closes it.
//!
//! The hook holds nothing but a tracer reference, so a single instance is
//! safe to register once and reuse across concurrent commands.

use bytes::BytesMut;
use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::{SpanKind, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};

use crate::command::Command;
use crate::serialize::{append_cmd, render, summarize_pipeline};

/// Error shape hooks surface to the driver.
///
/// This crate's hook never fails; the type exists so other hook
/// implementations registered alongside it can veto execution.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Instrumentation name handed to the global tracer provider.
const TRACER_NAME: &str = "redis-trace";

/// Callbacks a driver invokes around single and pipelined command
/// execution.
///
/// Before-calls receive the execution context and return it (usually
/// extended); after-calls receive the same context back and must undo
/// whatever their paired before-call set up. Calling an after method
/// without its paired before method is outside the contract; this crate's
/// implementation degrades to a logged no-op in that case.
pub trait CommandHook: Send + Sync {
    fn before_process(&self, cx: Context, cmd: &dyn Command) -> Result<Context, BoxError>;

    fn after_process(&self, cx: &Context, cmd: &dyn Command) -> Result<(), BoxError>;

    fn before_process_pipeline(
        &self,
        cx: Context,
        cmds: &[&dyn Command],
    ) -> Result<Context, BoxError>;

    fn after_process_pipeline(&self, cx: &Context, cmds: &[&dyn Command])
        -> Result<(), BoxError>;
}

/// A [`CommandHook`] that brackets every command with a tracing span.
///
/// Generic over the tracer so applications can inject one wired to their
/// own provider; [`TracingHook::from_global`] resolves the process-wide
/// default instead.
#[derive(Debug, Clone)]
pub struct TracingHook<T = BoxedTracer> {
    tracer: T,
}

impl TracingHook<BoxedTracer> {
    /// Hook backed by the globally registered tracer provider.
    pub fn from_global() -> Self {
        TracingHook::new(global::tracer(TRACER_NAME))
    }
}

impl<T> TracingHook<T>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    /// Hook backed by an explicitly supplied tracer.
    pub fn new(tracer: T) -> Self {
        TracingHook { tracer }
    }

    fn start_span(&self, cx: &Context, name: String, attributes: Vec<KeyValue>) -> T::Span {
        self.tracer
            .span_builder(name)
            .with_kind(SpanKind::Client)
            .with_attributes(attributes)
            .start_with_context(&self.tracer, cx)
    }
}

impl<T> CommandHook for TracingHook<T>
where
    T: Tracer + Send + Sync,
    T::Span: Send + Sync + 'static,
{
    fn before_process(&self, cx: Context, cmd: &dyn Command) -> Result<Context, BoxError> {
        let mut buf = BytesMut::with_capacity(32);
        append_cmd(&mut buf, cmd);

        let span = self.start_span(
            &cx,
            cmd.full_name().into_owned(),
            vec![
                KeyValue::new("db.system", "redis"),
                KeyValue::new("redis.cmd", render(buf)),
            ],
        );

        Ok(cx.with_span(span))
    }

    fn after_process(&self, cx: &Context, _cmd: &dyn Command) -> Result<(), BoxError> {
        finish_span(cx);
        Ok(())
    }

    fn before_process_pipeline(
        &self,
        cx: Context,
        cmds: &[&dyn Command],
    ) -> Result<Context, BoxError> {
        let summary = summarize_pipeline(cmds);

        let span = self.start_span(
            &cx,
            summary.span_name(),
            vec![
                KeyValue::new("db.system", "redis"),
                KeyValue::new("redis.num_cmd", cmds.len() as i64),
                KeyValue::new("redis.cmds", render(summary.cmds)),
            ],
        );

        Ok(cx.with_span(span))
    }

    fn after_process_pipeline(
        &self,
        cx: &Context,
        _cmds: &[&dyn Command],
    ) -> Result<(), BoxError> {
        finish_span(cx);
        Ok(())
    }
}

/// End the span carried by `cx`, if any.
///
/// An after-call on a context with no active span means the before/after
/// pairing was broken by the caller; recover as a no-op rather than touch
/// the tracing API's placeholder span.
fn finish_span(cx: &Context) {
    if !cx.has_active_span() {
        tracing::debug!("after-hook called on a context with no active span");
        return;
    }
    cx.span().end();
}
