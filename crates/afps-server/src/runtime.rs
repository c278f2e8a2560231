//! See [`AsyncRuntime`].

use std::sync::Arc;

/// Wrapper around [`tokio::runtime::Runtime`]. The HTTP front door and the
/// signaling store run on this; the tick loop owns its own dedicated
/// thread and never touches it.
#[derive(Clone)]
pub struct AsyncRuntime {
    runtime: Arc<tokio::runtime::Runtime>,
}

impl Default for AsyncRuntime {
    fn default() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("tokio runtime initialization");
        Self {
            runtime: Arc::new(runtime),
        }
    }
}

impl AsyncRuntime {
    #[must_use]
    pub fn handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }
}
