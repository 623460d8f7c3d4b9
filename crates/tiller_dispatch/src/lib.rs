//! # tiller_dispatch - UI-thread confinement
//!
//! One logical UI-owning thread performs all component construction, action
//! invocation and view mutation. Other threads hand work to it and either
//! block until completion or fire-and-forget. Debounced listeners coalesce
//! bursts of change notifications and always deliver on that thread.

pub mod debounce;
pub mod dispatcher;

pub use debounce::{DebouncedAccumulator, DebouncedListener};
pub use dispatcher::{DispatchError, Dispatcher};
