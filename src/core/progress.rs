//! Optional progress reporting for long orchestration runs

/// Caller-supplied progress sink, mirroring an interactive spinner.
///
/// The engine reports coarse-grained step boundaries through this trait; a
/// front end can render it however it likes. `NullProgress` discards
/// everything and is the default.
pub trait Progress: Send + Sync {
    fn start(&self, message: &str);
    fn succeed(&self, message: &str);
    fn info(&self, message: &str);
    fn fail(&self, message: &str);
}

/// Discards all progress events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn start(&self, _message: &str) {}
    fn succeed(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn fail(&self, _message: &str) {}
}

/// Forwards progress events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn start(&self, message: &str) {
        tracing::info!(step = message, "started");
    }

    fn succeed(&self, message: &str) {
        tracing::info!(step = message, "done");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn fail(&self, message: &str) {
        tracing::error!("{message}");
    }
}
