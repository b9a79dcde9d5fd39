use cronscope_core::CronService;

/// Daemon-wide shared state
///
/// Holds configuration only; job tables are read and written afresh on
/// every request.
pub struct DaemonState {
    pub service: CronService,
}

impl DaemonState {
    pub fn new(service: CronService) -> Self {
        Self { service }
    }
}
