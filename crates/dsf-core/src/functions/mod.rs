mod attributes;
mod dsf_interp_1d_fit;
mod factory;
mod parameters;
mod traits;

pub use attributes::{AttributeDeclaration, AttributeKind, AttributeValue};
pub use dsf_interp_1d_fit::{
    DSF_INTERP_1D_FIT, DsfInterp1DFit, DsfInterpAttributes, INTENSITY, LOAD_ERRORS,
    LOCAL_REGRESSION, PARAMETER_VALUES, QENS_CATEGORY, REBINNED_WORKSPACE, REGRESSION_TYPE,
    REGRESSION_WINDOW, TARGET_PARAMETER, ValidatedParams, WORKSPACE_INDEX, WORKSPACES,
    parse_parameter_values, split_workspace_names,
};
pub use factory::{
    DependencyUnavailable, FunctionConstructor, FunctionFactory, interpolation_backend,
    register_builtin_functions,
};
pub use parameters::{ParameterDeclaration, ParameterSet};
pub use traits::FitFunction1D;
