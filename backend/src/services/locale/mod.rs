//! Locale Service Module
//!
//! Decides which supported locale applies to an incoming request.
//!
//! # Architecture
//! ```text
//! start-up:    LocaleConfig ──► derive_order ──► ResolutionOrder
//!                          └──► LocaleRegistry::build ──► LocaleRegistry
//!
//! per request: RequestView ──► resolve(order, registry, policy) ──► ResolutionOutcome
//! ```
//!
//! Everything built at start-up is immutable, so a single `LocaleService`
//! is shared across requests without locking.

mod key_chain;
mod registry;
mod resolver;
mod service;

pub use key_chain::derive_order;
pub use registry::{LocaleRegistry, load_from_config_file, scan_directory};
pub use resolver::{NoMatchPolicy, resolve};
pub use service::LocaleService;
