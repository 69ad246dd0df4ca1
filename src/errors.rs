mod bridge;
mod collect;
mod evaluate;
mod install;
mod instantiate;
mod instantiator;
mod overrides;
mod resolve;

pub use bridge::BridgeErrorKind;
pub use collect::CollectErrorKind;
pub use evaluate::EvaluateErrorKind;
pub use install::InstallErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use overrides::OverrideErrorKind;
pub use resolve::ResolveErrorKind;

/// Result of a provider or class factory.
pub type InstantiatorResult<T, Err = InstantiateErrorKind> = Result<T, Err>;
