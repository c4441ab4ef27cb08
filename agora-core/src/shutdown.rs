use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
        signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&flag))?;
        info!("registered SIGINT/SIGTERM handlers");
        Ok(Self { flag })
    }

    pub fn is_shutdown(&self) -> bool {
        let shutdown = self.flag.load(Ordering::Relaxed);
        if shutdown {
            info!("shutdown signal observed");
        }
        shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn starts_not_shutdown() {
        let shutdown = Shutdown::new().expect("register signal handlers");
        assert!(!shutdown.is_shutdown());
    }

    #[test]
    fn flag_flip_is_observed() {
        let shutdown = Shutdown::new().expect("register signal handlers");
        let inner = shutdown.clone();
        inner.flag.store(true, Ordering::Relaxed);
        assert!(shutdown.is_shutdown());
    }
}
