//! Diagnostic logging collaborator
//!
//! The protocol core works unchanged with [`NullLogger`]; logging is never
//! load-bearing. Implementations must never be handed plaintext, key
//! material, or derived secrets — callers in this crate only format step
//! names and byte lengths.

/// Leveled diagnostic capability injected into the session cipher.
pub trait ZkLogger: Send + Sync {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn fatal(&self, msg: &str);
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl ZkLogger for NullLogger {
    fn debug(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
    fn fatal(&self, _msg: &str) {}
}

/// Forwards to the `log` crate facade. `fatal` maps to `log::error!`, the
/// highest level the facade offers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl ZkLogger for LogFacade {
    fn debug(&self, msg: &str) {
        log::debug!("{}", msg);
    }

    fn info(&self, msg: &str) {
        log::info!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!("{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!("{}", msg);
    }

    fn fatal(&self, msg: &str) {
        log::error!("FATAL: {}", msg);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn null_logger_discards() {
        let logger = NullLogger;
        logger.debug("step");
        logger.fatal("step");
    }

    #[test]
    fn loggers_are_object_safe() {
        let loggers: Vec<Box<dyn ZkLogger>> = vec![Box::new(NullLogger), Box::new(LogFacade)];
        for l in loggers {
            l.info("handshake established");
        }
    }
}
