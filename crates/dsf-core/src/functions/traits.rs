use super::attributes::{AttributeDeclaration, AttributeValue};
use super::parameters::ParameterSet;
use crate::domain::DsfResult;
use crate::workspace::AnalysisHost;
use tracing::debug;

/// A fit function of one independent variable, driven by a host fitting loop.
pub trait FitFunction1D {
    fn name(&self) -> &'static str;

    fn category(&self) -> &'static str;

    fn parameters(&self) -> &ParameterSet;

    fn parameters_mut(&mut self) -> &mut ParameterSet;

    fn declared_attributes(&self) -> &[AttributeDeclaration];

    /// Store a typed attribute value. Names the function does not declare
    /// are ignored.
    fn set_attribute(&mut self, name: &str, value: AttributeValue) -> DsfResult<()>;

    fn function_1d(&mut self, host: &mut dyn AnalysisHost, x: &[f64]) -> DsfResult<Vec<f64>>;

    fn parameter(&self, name: &str) -> DsfResult<f64> {
        self.parameters().get(name)
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> DsfResult<()> {
        self.parameters_mut().set(name, value)
    }

    /// Parse `raw` as the declared kind of `name` and store it.
    fn set_attribute_str(&mut self, name: &str, raw: &str) -> DsfResult<()> {
        let Some(kind) = self
            .declared_attributes()
            .iter()
            .find(|declaration| declaration.name == name)
            .map(AttributeDeclaration::kind)
        else {
            debug!(function = self.name(), attribute = name, "ignoring unknown attribute");
            return Ok(());
        };
        self.set_attribute(name, AttributeValue::parse(kind, raw)?)
    }
}
