//! Command-Level Tracing Hooks for Redis Clients
//!
//! Brackets every Redis command (and pipeline) a driver executes with an
//! OpenTelemetry span, tagged with a bounded, human-readable rendering of
//! the command text. Drivers thread an [`opentelemetry::Context`] through
//! the before/after hook pair; the before-call attaches the span to the
//! context and the after-call ends it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use redis_trace::{CommandHook, TracingHook};
//! use opentelemetry::Context;
//!
//! let hook = TracingHook::from_global();
//!
//! // Inside the driver's execution path:
//! let cx = hook.before_process(Context::current(), &cmd)?;
//! let result = execute(&cmd);
//! hook.after_process(&cx, &cmd)?;
//! ```
//!
//! # Span attributes
//!
//! | Attribute | Single command | Pipeline |
//! |-----------|----------------|----------|
//! | `db.system` | `redis` | `redis` |
//! | `redis.cmd` | serialized command | `` |
//! | `redis.num_cmd` | `` | total command count |
//! | `redis.cmds` | `` | newline-joined serializations |
//!
//! Span names are the command keyword (`SET`, `HGET`, ...) or, for
//! pipelines, `pipeline` followed by up to ten unique keywords.
//!
//! # Features
//!
//! - `redis`: implements [`Command`] for `redis::Cmd` so redis-rs
//!   commands trace without a wrapper.
//! - `datadog`: turnkey exporter setup ([`config`], [`tracing_setup`])
//!   shipping spans to a Datadog agent.

pub mod command;
pub mod hook;
pub mod serialize;

#[cfg(feature = "redis")]
pub mod client;

#[cfg(feature = "datadog")]
pub mod config;
#[cfg(feature = "datadog")]
pub mod tracing_setup;

pub use command::{Arg, Command};
pub use hook::{BoxError, CommandHook, TracingHook};

#[cfg(feature = "datadog")]
pub use config::TelemetryConfig;
#[cfg(feature = "datadog")]
pub use tracing_setup::{init as init_telemetry, Telemetry};
