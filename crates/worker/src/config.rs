use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    /// Delay between run starts. `None` runs once and exits.
    pub interval: Option<Duration>,
}

impl WorkerConfig {
    /// `DISPATCH_INTERVAL_SECS`: unset, `0` or unparseable means run once.
    pub fn from_env() -> Self {
        let interval = std::env::var("DISPATCH_INTERVAL_SECS")
            .ok()
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring unparseable DISPATCH_INTERVAL_SECS");
                    None
                }
            })
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self { interval }
    }
}
