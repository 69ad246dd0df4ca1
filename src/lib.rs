#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod binder;
pub(crate) mod bridge;
pub(crate) mod collector;
pub(crate) mod dependency_resolver;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod evaluator;
pub(crate) mod finalizer;
pub(crate) mod inject;
pub(crate) mod installer;
pub(crate) mod instantiator;
pub(crate) mod integrations;
pub(crate) mod locator;
pub(crate) mod module;
pub(crate) mod override_resolver;
pub(crate) mod qualifier;
pub(crate) mod service;
pub(crate) mod slot;

pub use any::TypeInfo;
pub use binder::{Binder, BindingBuilder};
pub use bridge::Bridge;
pub use collector::{collect, Collected};
pub use dependency_resolver::{DependencyResolver, Resolver};
pub use descriptor::{BindingDescriptor, FinalDescriptorSet, OverrideDirective, Strategy};
pub use errors::{
    BridgeErrorKind, CollectErrorKind, EvaluateErrorKind, InstallErrorKind, InstantiateErrorKind, InstantiatorErrorKind,
    InstantiatorResult, OverrideErrorKind, ResolveErrorKind,
};
pub use evaluator::evaluate;
pub use finalizer::Finalizer;
pub use inject::{Inject, InjectWith};
pub use installer::{install, uninstall, Installation, InstallationId};
pub use instantiator::{Config, Factory, Instantiator};
pub use locator::Locator;
pub use module::{Module, Overrides};
pub use override_resolver::resolve;
pub use qualifier::{normalize, Qualifier, QualifierKey, Qualify, Unqualified};
pub use slot::Slot;

#[cfg(feature = "axum")]
pub use integrations::axum;

#[doc(hidden)]
pub mod __private {
    pub use alloc::{boxed::Box, vec};
}
