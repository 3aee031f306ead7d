//! Fit function that interpolates a family of reference DSFs to a target
//! parameter value and scales the result by an intensity.
//!
//! The reference set is named by the `Workspaces` attribute, one workspace per
//! value listed in `ParameterValues`. The interpolator is built on the first
//! evaluation, on a bin grid derived from that evaluation's sample points, and
//! reused for every later call. Attribute changes made after that point have
//! no effect on it.
//!
//! Parameters outside their valid range do not raise: evaluation logs the
//! problem and returns zeros.

use super::attributes::{AttributeDeclaration, AttributeValue};
use super::parameters::{ParameterDeclaration, ParameterSet};
use super::traits::FitFunction1D;
use crate::algorithms::RebinParams;
use crate::domain::{DsfError, DsfResult, RegressionType};
use crate::interp::{ChannelGroup, ChannelGroupInterpolator, Dsf, DsfGroup, InterpolatorConfig};
use crate::numerics::min_max;
use crate::workspace::AnalysisHost;
use tracing::{debug, error, info};

pub const DSF_INTERP_1D_FIT: &str = "DSFinterp1DFit";
pub const QENS_CATEGORY: &str = "QENS";

pub const INTENSITY: &str = "Intensity";
pub const TARGET_PARAMETER: &str = "TargetParameter";

pub const WORKSPACES: &str = "Workspaces";
pub const LOAD_ERRORS: &str = "LoadErrors";
pub const WORKSPACE_INDEX: &str = "WorkspaceIndex";
pub const PARAMETER_VALUES: &str = "ParameterValues";
pub const LOCAL_REGRESSION: &str = "LocalRegression";
pub const REGRESSION_TYPE: &str = "RegressionType";
pub const REGRESSION_WINDOW: &str = "RegressionWindow";

/// Scratch name for the per-source rebin output during initialization.
pub const REBINNED_WORKSPACE: &str = "__dsfinterp_rebinned";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParams {
    pub intensity: f64,
    pub target_parameter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DsfInterpAttributes {
    pub workspaces: Vec<String>,
    pub load_errors: bool,
    pub workspace_index: i64,
    pub parameter_values: Vec<f64>,
    pub parameter_bounds: Option<(f64, f64)>,
    pub local_regression: bool,
    pub regression_type: String,
    pub regression_window: i64,
}

impl Default for DsfInterpAttributes {
    fn default() -> Self {
        Self {
            workspaces: Vec::new(),
            load_errors: false,
            workspace_index: 0,
            parameter_values: Vec::new(),
            parameter_bounds: None,
            local_regression: true,
            regression_type: RegressionType::Quadratic.as_str().to_string(),
            regression_window: 6,
        }
    }
}

/// Comma-separated when any comma is present, whitespace-separated otherwise.
pub fn split_workspace_names(raw: &str) -> Vec<String> {
    if raw.contains(',') {
        raw.split(',').map(|name| name.trim().to_string()).collect()
    } else {
        raw.split_whitespace().map(str::to_string).collect()
    }
}

pub fn parse_parameter_values(raw: &str) -> DsfResult<Vec<f64>> {
    raw.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                DsfError::input_validation(
                    "INPUT.PARAMETER_VALUES",
                    format!("parameter value '{token}' is not a number"),
                )
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
enum InterpolatorState {
    #[default]
    Unconfigured,
    Ready(ChannelGroupInterpolator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DsfInterp1DFit {
    parameters: ParameterSet,
    declared_attributes: Vec<AttributeDeclaration>,
    attributes: DsfInterpAttributes,
    state: InterpolatorState,
}

impl Default for DsfInterp1DFit {
    fn default() -> Self {
        Self::new()
    }
}

impl DsfInterp1DFit {
    pub fn new() -> Self {
        let mut parameters = ParameterSet::new();
        for declaration in [
            ParameterDeclaration::new(INTENSITY, 1.0, "Intensity"),
            ParameterDeclaration::new(
                TARGET_PARAMETER,
                1.0,
                "Target value of the structure factor parameter",
            ),
        ] {
            // Names are distinct constants, so declaration cannot collide.
            let _ = parameters.declare(declaration);
        }

        let declared_attributes = vec![
            AttributeDeclaration::new(WORKSPACES, AttributeValue::Str(String::new())),
            AttributeDeclaration::new(LOAD_ERRORS, AttributeValue::Bool(false)),
            AttributeDeclaration::new(WORKSPACE_INDEX, AttributeValue::Int(0)),
            AttributeDeclaration::new(PARAMETER_VALUES, AttributeValue::Str(String::new())),
            AttributeDeclaration::new(LOCAL_REGRESSION, AttributeValue::Bool(true)),
            AttributeDeclaration::new(
                REGRESSION_TYPE,
                AttributeValue::Str(RegressionType::Quadratic.as_str().to_string()),
            ),
            AttributeDeclaration::new(REGRESSION_WINDOW, AttributeValue::Int(6)),
        ];

        Self {
            parameters,
            declared_attributes,
            attributes: DsfInterpAttributes::default(),
            state: InterpolatorState::Unconfigured,
        }
    }

    pub fn attributes(&self) -> &DsfInterpAttributes {
        &self.attributes
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, InterpolatorState::Ready(_))
    }

    pub fn interpolator(&self) -> Option<&ChannelGroupInterpolator> {
        match &self.state {
            InterpolatorState::Ready(interpolator) => Some(interpolator),
            InterpolatorState::Unconfigured => None,
        }
    }

    /// Current parameters when they are usable, `None` (logged) otherwise.
    pub fn validate_params(&self) -> Option<ValidatedParams> {
        let intensity = self.parameters.get(INTENSITY).ok()?;
        if intensity <= 0.0 {
            error!(
                "Parameter Intensity in {} must be positive. Got {} instead",
                DSF_INTERP_1D_FIT, intensity
            );
            return None;
        }

        let target_parameter = self.parameters.get(TARGET_PARAMETER).ok()?;
        if let Some((fmin, fmax)) = self.attributes.parameter_bounds {
            if target_parameter < fmin || target_parameter > fmax {
                error!(
                    "TargetParameter {} is out of bounds [{}, {}]. Applying penalty...",
                    target_parameter, fmin, fmax
                );
                return None;
            }
        }

        Some(ValidatedParams {
            intensity,
            target_parameter,
        })
    }

    fn initialize(
        &self,
        host: &mut dyn AnalysisHost,
        x: &[f64],
    ) -> DsfResult<ChannelGroupInterpolator> {
        let attributes = &self.attributes;

        let workspace_index = usize::try_from(attributes.workspace_index).ok();
        for name in &attributes.workspaces {
            let histograms = host.histogram_count(name)?;
            if workspace_index.is_none_or(|index| histograms <= index) {
                return Err(logged(DsfError::index_out_of_bounds(
                    "FIT.WORKSPACE_INDEX",
                    format!(
                        "Number of histograms in Workspace {} does not allow for workspace index {}",
                        name, attributes.workspace_index
                    ),
                )));
            }
        }
        let workspace_index = workspace_index.unwrap_or_default();

        if attributes.parameter_values.len() != attributes.workspaces.len() {
            return Err(logged(DsfError::count_mismatch(
                "FIT.PARAMETER_COUNT",
                format!(
                    "Number of Workspaces and ParameterValues should be the same. Found {} and {}, respectively",
                    attributes.workspaces.len(),
                    attributes.parameter_values.len()
                ),
            )));
        }

        let Some(regression) = RegressionType::parse(&attributes.regression_type) else {
            return Err(logged(DsfError::not_implemented(
                "FIT.REGRESSION_TYPE",
                format!(
                    "Regression type {} not implemented. choose one of {}",
                    attributes.regression_type,
                    RegressionType::supported_names()
                ),
            )));
        };

        let min_window = regression.min_window();
        if attributes.regression_window < min_window as i64 {
            return Err(logged(DsfError::invalid_configuration(
                "FIT.REGRESSION_WINDOW",
                format!(
                    "RegressionWindow must be equal or bigger than {} for regression type {}",
                    min_window, regression
                ),
            )));
        }

        let params = RebinParams::centered_on(x)?;
        debug!(
            start = params.start,
            width = params.width,
            end = params.end,
            "rebinning reference workspaces"
        );

        let group = load_reference_group(host, attributes, workspace_index, params);
        host.discard(REBINNED_WORKSPACE);
        let group = group?;

        let config = if attributes.local_regression {
            InterpolatorConfig::running_regression(regression, attributes.regression_window as usize)
        } else {
            InterpolatorConfig::without_regression()
        };
        let interpolator = ChannelGroup::from_dsf_group(&group)?.build_interpolator(config)?;
        info!(
            references = group.len(),
            channels = interpolator.channel_count(),
            window = config.window,
            "initialized {} interpolator",
            DSF_INTERP_1D_FIT
        );
        Ok(interpolator)
    }
}

fn load_reference_group(
    host: &mut dyn AnalysisHost,
    attributes: &DsfInterpAttributes,
    workspace_index: usize,
    params: RebinParams,
) -> DsfResult<DsfGroup> {
    let mut group = DsfGroup::new();
    for (name, &fvalue) in attributes.workspaces.iter().zip(&attributes.parameter_values) {
        host.rebin(name, params, REBINNED_WORKSPACE)?;
        let spectrum = host.spectrum(REBINNED_WORKSPACE, workspace_index)?;
        let (_, intensities, errors) = spectrum.into_parts();
        let mut dsf = Dsf::new(intensities, fvalue);
        if attributes.load_errors {
            dsf.set_errors(errors)?;
        }
        group.insert(dsf)?;
    }
    Ok(group)
}

fn logged(error: DsfError) -> DsfError {
    error!("{}", error.message());
    error
}

impl FitFunction1D for DsfInterp1DFit {
    fn name(&self) -> &'static str {
        DSF_INTERP_1D_FIT
    }

    fn category(&self) -> &'static str {
        QENS_CATEGORY
    }

    fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    fn declared_attributes(&self) -> &[AttributeDeclaration] {
        &self.declared_attributes
    }

    fn set_attribute(&mut self, name: &str, value: AttributeValue) -> DsfResult<()> {
        let attributes = &mut self.attributes;
        match name {
            WORKSPACES => attributes.workspaces = split_workspace_names(&value.as_string()?),
            LOAD_ERRORS => attributes.load_errors = value.as_bool()?,
            WORKSPACE_INDEX => attributes.workspace_index = value.as_int()?,
            PARAMETER_VALUES => {
                let values = parse_parameter_values(&value.as_string()?)?;
                attributes.parameter_bounds = min_max(&values);
                attributes.parameter_values = values;
            }
            LOCAL_REGRESSION => attributes.local_regression = value.as_bool()?,
            REGRESSION_TYPE => attributes.regression_type = value.as_string()?.to_lowercase(),
            REGRESSION_WINDOW => attributes.regression_window = value.as_int()?,
            _ => debug!(function = DSF_INTERP_1D_FIT, attribute = name, "ignoring unknown attribute"),
        }
        Ok(())
    }

    fn function_1d(&mut self, host: &mut dyn AnalysisHost, x: &[f64]) -> DsfResult<Vec<f64>> {
        let Some(params) = self.validate_params() else {
            return Ok(vec![0.0; x.len()]);
        };

        if let InterpolatorState::Unconfigured = self.state {
            let interpolator = self.initialize(host, x)?;
            self.state = InterpolatorState::Ready(interpolator);
        }
        let InterpolatorState::Ready(interpolator) = &self.state else {
            return Err(DsfError::internal(
                "SYS.INTERPOLATOR_STATE",
                "interpolator missing after initialization",
            ));
        };

        let dsf = interpolator.evaluate(params.target_parameter);
        if dsf.channel_count() != x.len() {
            return Err(logged(DsfError::computation(
                "RUN.SAMPLE_GRID",
                format!(
                    "interpolator was built for {} sample points, got {}",
                    dsf.channel_count(),
                    x.len()
                ),
            )));
        }

        Ok(dsf
            .into_intensities()
            .into_iter()
            .map(|value| params.intensity * value)
            .collect())
    }
}
