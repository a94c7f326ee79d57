use std::time::Duration;

/// Timing knobs shared by every profile's loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Upper bound on how long an idle loop sleeps between selections.
    pub tick_interval: Duration,
    /// Safety-net delay applied when a body records no scheduling decision.
    pub default_retry: Duration,
    /// Gate block applied after a recoverable signal. Zero disables it.
    pub recoverable_cooldown: Duration,
    /// How long a task waits for the automation client before giving up.
    pub resource_timeout: Duration,
    pub navigation_attempts: u32,
    pub navigation_pacing: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            default_retry: Duration::from_secs(300),
            recoverable_cooldown: Duration::from_secs(5),
            resource_timeout: Duration::from_secs(30),
            navigation_attempts: 3,
            navigation_pacing: Duration::from_millis(800),
        }
    }
}
