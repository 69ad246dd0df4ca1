use alloc::{collections::BTreeMap, collections::BTreeSet, sync::Arc, vec::Vec};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::RcAny,
    dependency_resolver::Resolver,
    descriptor::{FinalDescriptorSet, Strategy},
    errors::{EvaluateErrorKind, ResolveErrorKind},
    slot::Slot,
};

/// Evaluates every provider of the set once, in dependency order.
///
/// The returned set has the same slots, with each provider strategy replaced by an instance strategy
/// holding the provided value. Declared module and finalizer of each binding are kept.
///
/// # Errors
/// - [`EvaluateErrorKind::UnsatisfiedDependency`] if a provider or class binding depends on a slot absent from the set
/// - [`EvaluateErrorKind::ProviderCycle`] if provider and class dependencies form a cycle
/// - [`EvaluateErrorKind::Provider`] if a provider factory fails
pub fn evaluate(set: FinalDescriptorSet) -> Result<FinalDescriptorSet, EvaluateErrorKind> {
    let span = info_span!("evaluate", slots = set.len());
    let _guard = span.enter();

    check_dependencies(&set)?;
    dfs_detect(&set)?;

    let evaluator = Evaluator::new(set);
    let providers: Vec<Slot> = evaluator
        .descriptors
        .iter()
        .filter(|descriptor| matches!(descriptor.strategy, Strategy::Provider { .. }))
        .map(|descriptor| descriptor.slot.clone())
        .collect();

    for slot in &providers {
        if let Err(source) = evaluator.resolve_slot(slot) {
            let err = EvaluateErrorKind::Provider { slot: slot.clone(), source };
            error!("{}", err);
            return Err(err);
        }
    }

    let Evaluator { descriptors, evaluated } = evaluator;
    let mut evaluated = core::mem::take(&mut *evaluated.lock());
    let mut set = Arc::unwrap_or_clone(descriptors);

    for descriptor in set.descriptors.values_mut() {
        if let Strategy::Provider { .. } = descriptor.strategy {
            if let Some(value) = evaluated.remove(&descriptor.slot) {
                descriptor.strategy = Strategy::Instance(value);
            }
        }
    }

    debug!(providers = providers.len(), "Evaluated");

    Ok(set)
}

fn check_dependencies(set: &FinalDescriptorSet) -> Result<(), EvaluateErrorKind> {
    for descriptor in set.iter() {
        for dependency in descriptor.strategy.dependencies() {
            if !set.contains(dependency) {
                let err = EvaluateErrorKind::UnsatisfiedDependency {
                    dependent: descriptor.slot.clone(),
                    missing: dependency.clone(),
                };
                error!("{}", err);
                return Err(err);
            }
        }
    }
    Ok(())
}

fn dfs_detect(set: &FinalDescriptorSet) -> Result<(), EvaluateErrorKind> {
    let mut visited = BTreeSet::new();
    let mut stack = Vec::new();

    for slot in set.slots() {
        if let Some(cycle) = dfs_visit(set, slot, &mut visited, &mut stack) {
            let err = EvaluateErrorKind::ProviderCycle {
                cycle: cycle.into_boxed_slice(),
            };
            error!("{}", err);
            return Err(err);
        }
    }
    Ok(())
}

/// Returns the slots of the first found cycle, starting from the slot that closes it
fn dfs_visit<'a>(
    set: &'a FinalDescriptorSet,
    slot: &'a Slot,
    visited: &mut BTreeSet<&'a Slot>,
    stack: &mut Vec<&'a Slot>,
) -> Option<Vec<Slot>> {
    if visited.contains(slot) {
        return None;
    }
    if let Some(pos) = stack.iter().position(|entry| *entry == slot) {
        return Some(stack[pos..].iter().map(|slot| (*slot).clone()).collect());
    }
    stack.push(slot);

    if let Some(descriptor) = set.get(slot) {
        for dependency in descriptor.strategy.dependencies() {
            if let Some(cycle) = dfs_visit(set, dependency, visited, stack) {
                return Some(cycle);
            }
        }
    }

    stack.pop();
    visited.insert(slot);
    None
}

/// Resolves slots against the final set while providers are evaluated.
/// Provided values are cached, class bindings are constructed for each request.
#[derive(Clone)]
struct Evaluator {
    descriptors: Arc<FinalDescriptorSet>,
    evaluated: Arc<Mutex<BTreeMap<Slot, RcAny>>>,
}

impl Evaluator {
    fn new(set: FinalDescriptorSet) -> Self {
        Self {
            descriptors: Arc::new(set),
            evaluated: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl Resolver for Evaluator {
    fn resolve_slot(&self, slot: &Slot) -> Result<RcAny, ResolveErrorKind> {
        if let Some(value) = self.evaluated.lock().get(slot) {
            return Ok(value.clone());
        }

        let Some(descriptor) = self.descriptors.get(slot) else {
            return Err(ResolveErrorKind::NotFound { slot: slot.clone() });
        };

        match &descriptor.strategy {
            Strategy::Instance(value) => Ok(value.clone()),
            Strategy::Provider { factory, .. } => {
                let value = factory.call(Arc::new(self.clone()))?;
                debug!(%slot, "Provider evaluated");
                self.evaluated.lock().insert(slot.clone(), value.clone());
                Ok(value)
            }
            Strategy::Class { factory, .. } => factory.call(Arc::new(self.clone())),
        }
    }
}
