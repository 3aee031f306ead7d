use super::dsf_interp_1d_fit::{DSF_INTERP_1D_FIT, DsfInterp1DFit, QENS_CATEGORY};
use super::traits::FitFunction1D;
use crate::domain::{DsfError, DsfResult};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

pub type FunctionConstructor = fn() -> Box<dyn FitFunction1D>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{dependency} is not available: {reason}")]
pub struct DependencyUnavailable {
    pub dependency: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    category: &'static str,
    constructor: FunctionConstructor,
}

/// Registry of fit functions keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct FunctionFactory {
    subscriptions: BTreeMap<&'static str, Subscription>,
}

impl FunctionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        name: &'static str,
        category: &'static str,
        constructor: FunctionConstructor,
    ) -> DsfResult<()> {
        if self.subscriptions.contains_key(name) {
            return Err(DsfError::invalid_configuration(
                "FACTORY.DUPLICATE",
                format!("function '{name}' is already registered"),
            ));
        }
        self.subscriptions.insert(
            name,
            Subscription {
                category,
                constructor,
            },
        );
        Ok(())
    }

    /// Subscribe only when `probe` reports the function's backing
    /// dependency as available. Returns whether the function was registered.
    pub fn subscribe_optional(
        &mut self,
        name: &'static str,
        category: &'static str,
        probe: impl FnOnce() -> Result<(), DependencyUnavailable>,
        constructor: FunctionConstructor,
    ) -> DsfResult<bool> {
        if let Err(unavailable) = probe() {
            debug!(function = name, "skipping registration: {}", unavailable);
            return Ok(false);
        }
        self.subscribe(name, category, constructor)?;
        Ok(true)
    }

    pub fn create(&self, name: &str) -> DsfResult<Box<dyn FitFunction1D>> {
        self.subscriptions
            .get(name)
            .map(|subscription| (subscription.constructor)())
            .ok_or_else(|| {
                DsfError::input_validation(
                    "INPUT.UNKNOWN_FUNCTION",
                    format!("function '{name}' is not registered"),
                )
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subscriptions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.subscriptions.keys().copied()
    }

    pub fn category(&self, name: &str) -> Option<&'static str> {
        self.subscriptions
            .get(name)
            .map(|subscription| subscription.category)
    }
}

pub fn interpolation_backend() -> Result<(), DependencyUnavailable> {
    if cfg!(feature = "interpolation") {
        Ok(())
    } else {
        Err(DependencyUnavailable {
            dependency: "interpolation",
            reason: "dsf-core was built without the `interpolation` feature".to_string(),
        })
    }
}

pub fn register_builtin_functions(factory: &mut FunctionFactory) -> DsfResult<()> {
    factory.subscribe_optional(
        DSF_INTERP_1D_FIT,
        QENS_CATEGORY,
        interpolation_backend,
        new_dsf_interp_1d_fit,
    )?;
    Ok(())
}

fn new_dsf_interp_1d_fit() -> Box<dyn FitFunction1D> {
    Box::new(DsfInterp1DFit::new())
}
