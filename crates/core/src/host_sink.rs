use crate::error::Error;

/// The host's logging capability (Design Notes "Global ambient
/// logger/connection → Pass a `HostSink` capability into each
/// workspace").
///
/// The core itself never reaches for a global logger directly; every
/// crate logs through the `log` facade macros, which are no-ops until a
/// `HostSink` is installed. This means the core must not panic or
/// misbehave if the host never calls [`HostSink::install`] — messages are
/// simply dropped by `log`'s default no-op backend.
pub struct HostSink {
    logger: Box<dyn log::Log>,
    max_level: log::LevelFilter,
}

impl HostSink {
    pub fn new(logger: Box<dyn log::Log>, max_level: log::LevelFilter) -> Self {
        HostSink { logger, max_level }
    }

    /// Install this sink as the process-wide `log` backend.
    ///
    /// May only be called once per process; a second call from another
    /// workspace returns `Io` wrapping the `SetLoggerError` the `log`
    /// crate raises, which the host should treat as "already installed"
    /// rather than fatal.
    pub fn install(self) -> Result<(), Error> {
        log::set_max_level(self.max_level);
        log::set_boxed_logger(self.logger)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }
}
