//! Process-wide panic hook shared by every live router

use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Mutex, OnceLock, Weak};

/// Receiver for panic notifications; implemented by the router core.
pub(crate) trait PanicLogger: Send + Sync {
    fn log_panic(&self, message: &str);
}

type PreviousHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

struct Registry {
    entries: Vec<(u64, Weak<dyn PanicLogger>)>,
    previous: Option<PreviousHook>,
    next_token: u64,
}

static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();

fn registry() -> &'static Mutex<Registry> {
    REGISTRY.get_or_init(|| {
        Mutex::new(Registry {
            entries: Vec::new(),
            previous: None,
            next_token: 1,
        })
    })
}

/// Register a panic receiver. The hook is installed when the first
/// receiver registers, chaining whatever hook was already in place.
/// Returns a token for [`unregister`].
pub(crate) fn register(logger: Weak<dyn PanicLogger>) -> u64 {
    let Ok(mut registry) = registry().lock() else {
        return 0;
    };
    if registry.entries.is_empty() && registry.previous.is_none() {
        registry.previous = Some(Arc::from(panic::take_hook()));
        panic::set_hook(Box::new(panic_handler));
    }
    let token = registry.next_token;
    registry.next_token += 1;
    registry.entries.push((token, logger));
    token
}

/// Drop a receiver. When the last one leaves, the previously installed
/// hook is restored.
pub(crate) fn unregister(token: u64) {
    if token == 0 {
        return;
    }
    let Ok(mut registry) = registry().lock() else {
        return;
    };
    registry.entries.retain(|(t, _)| *t != token);
    if registry.entries.is_empty() {
        if let Some(previous) = registry.previous.take() {
            panic::set_hook(Box::new(move |info| previous(info)));
        }
    }
}

fn panic_handler(info: &PanicHookInfo<'_>) {
    // One line, so split-lines routers emit a single record per panic.
    let message = format!("PANIC: {info}").replace(['\r', '\n'], " ");
    // Snapshot under the lock, call everything outside it: the chained
    // hook and the loggers may themselves touch the registry.
    let (previous, loggers) = {
        let Ok(mut registry) = registry().lock() else {
            return;
        };
        registry.entries.retain(|(_, weak)| weak.strong_count() > 0);
        let loggers: Vec<_> = registry
            .entries
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect();
        (registry.previous.clone(), loggers)
    };
    // The chained hook prints first; a logger below may abort the
    // process on a fatal record.
    if let Some(previous) = previous {
        previous(info);
    }
    for logger in loggers {
        // A panicking log path must not turn the hook into an abort.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.log_panic(&message);
        }));
    }
}
