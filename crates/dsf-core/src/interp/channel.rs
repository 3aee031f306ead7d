use crate::domain::{DsfError, DsfResult, RegressionType};
use crate::numerics::{NaturalCubicSpline, RunningRegressionInput, running_regression};

/// How each channel is interpolated along the parameter axis. A zero
/// `window` disables running regression and splines the raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolatorConfig {
    pub regression: RegressionType,
    pub window: usize,
}

impl InterpolatorConfig {
    pub fn running_regression(regression: RegressionType, window: usize) -> Self {
        Self { regression, window }
    }

    pub fn without_regression() -> Self {
        Self {
            regression: RegressionType::Linear,
            window: 0,
        }
    }

    pub fn uses_regression(&self) -> bool {
        self.window > 0
    }
}

/// Values of one energy channel across all reference parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    fvalues: Vec<f64>,
    intensities: Vec<f64>,
    errors: Option<Vec<f64>>,
}

impl Channel {
    /// `fvalues` must be sorted ascending and free of duplicates.
    pub fn new(fvalues: Vec<f64>, intensities: Vec<f64>, errors: Option<Vec<f64>>) -> Self {
        Self {
            fvalues,
            intensities,
            errors,
        }
    }

    pub fn fvalues(&self) -> &[f64] {
        &self.fvalues
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn errors(&self) -> Option<&[f64]> {
        self.errors.as_deref()
    }

    pub fn build_interpolator(
        &self,
        config: InterpolatorConfig,
    ) -> DsfResult<ChannelInterpolator> {
        let (values, errors) = if config.uses_regression() {
            let fits = running_regression(RunningRegressionInput::new(
                &self.fvalues,
                &self.intensities,
                self.errors.as_deref(),
                config.regression,
                config.window,
            ))
            .map_err(|error| {
                DsfError::computation("RUN.RUNNING_REGRESSION", error.to_string())
            })?;
            let values: Vec<f64> = fits.iter().map(|fit| fit.value).collect();
            let errors: Vec<f64> = fits.iter().map(|fit| fit.error).collect();
            (values, Some(errors))
        } else {
            (self.intensities.clone(), self.errors.clone())
        };

        let values = spline(self.fvalues.clone(), values)?;
        let errors = errors
            .map(|errors| spline(self.fvalues.clone(), errors))
            .transpose()?;
        Ok(ChannelInterpolator { values, errors })
    }
}

fn spline(knots: Vec<f64>, values: Vec<f64>) -> DsfResult<NaturalCubicSpline> {
    NaturalCubicSpline::new(knots, values)
        .map_err(|error| DsfError::computation("RUN.CHANNEL_SPLINE", error.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInterpolator {
    values: NaturalCubicSpline,
    errors: Option<NaturalCubicSpline>,
}

impl ChannelInterpolator {
    pub fn value(&self, fvalue: f64) -> f64 {
        self.values.evaluate(fvalue)
    }

    /// Interpolated uncertainty, clamped at zero since the spline may
    /// undershoot between knots.
    pub fn error(&self, fvalue: f64) -> Option<f64> {
        self.errors
            .as_ref()
            .map(|errors| errors.evaluate(fvalue).max(0.0))
    }
}
