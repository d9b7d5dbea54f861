use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "CarePulse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime configuration, constructed explicitly by the host process and
/// passed down at construction. There is no module-level client or lazily
/// initialized global state anywhere in the core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Last post-op day (inclusive) covered by the check-in program.
    /// Day 0 is surgery day.
    pub program_days: i64,
    /// Upper bound on any single messaging gateway call.
    pub gateway_timeout: Duration,
    /// Kill switch for the scheduled bulk run. The admin force-send path
    /// ignores this.
    pub scheduler_enabled: bool,
    /// Demo-mode SMS routing (see [`DemoRouting`]).
    pub demo: DemoRouting,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            program_days: 14,
            gateway_timeout: Duration::from_secs(10),
            scheduler_enabled: true,
            demo: DemoRouting::default(),
        }
    }
}

/// Demo-mode routing: when enabled, outbound SMS to numbers outside the
/// allowlist are redirected to a single test number with the original
/// (redacted) destination prefixed into the body.
#[derive(Debug, Clone, Default)]
pub struct DemoRouting {
    pub enabled: bool,
    pub route_all_to: Option<String>,
    pub allowlist: Vec<String>,
}
