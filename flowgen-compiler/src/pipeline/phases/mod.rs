//! Built-in compilation phases, in execution order.

mod analyze;
mod bind;
mod discovery;
mod dispatch;
mod extract;
mod resolve;

pub use analyze::AnalyzePhase;
pub use bind::BindPhase;
pub use discovery::DiscoveryPhase;
pub use dispatch::DispatchPhase;
pub use extract::ExtractPhase;
pub use resolve::{ResolveTargetsPhase, resolve_targets};
