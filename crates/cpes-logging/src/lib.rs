//! ---
//! cpes_section: "05-persistence-logging"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Structured logging adapters and sinks."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
#![warn(missing_docs)]

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

/// Initialize a baseline tracing subscriber suitable for development.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Initialize tracing with an explicit default filter, still overridable
/// through `RUST_LOG`.
pub fn init_with_filter(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.to_owned()));
    let _ = Registry::default()
        .with(env_filter)
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context attached to lifecycle events.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Scenario name associated with the log event.
    pub scenario: Option<&'a str>,
    /// Discrete timestep or sequence number.
    pub tick: Option<u64>,
    /// Reading origin (simulation, upload, manual).
    pub source: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a scenario name.
    pub fn with_scenario(mut self, scenario: &'a str) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// Attach a tick value.
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attach a reading source descriptor.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            SystemEventOutcome::Success => Level::INFO,
            SystemEventOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized system event with a success/fault outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    macro_rules! emit {
        ($level:expr) => {
            tracing::event!(
                $level,
                event,
                outcome = outcome.as_str(),
                scenario = ctx.scenario.unwrap_or(""),
                tick = ctx.tick.unwrap_or_default(),
                source = ctx.source.unwrap_or(""),
                message = %message
            )
        };
    }
    match outcome.level() {
        Level::ERROR => emit!(Level::ERROR),
        _ => emit!(Level::INFO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic() {
        init();
        init_with_filter("debug");
    }

    #[test]
    fn system_event_helper_emits() {
        init();
        let ctx = LogContext::new()
            .with_scenario("Baseline")
            .with_source("simulation")
            .with_tick(288);
        log_system_event(
            Some(&ctx),
            "simulation.complete",
            "system event helper executed",
            SystemEventOutcome::Success,
        );
        log_system_event(
            None,
            "simulation.complete",
            "system event helper fault",
            SystemEventOutcome::Fault,
        );
    }
}
