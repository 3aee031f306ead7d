use crate::domain::{DsfError, DsfResult};

/// A dynamic structure factor sampled on a fixed channel grid, tagged with
/// the parameter value it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct Dsf {
    intensities: Vec<f64>,
    errors: Option<Vec<f64>>,
    fvalue: f64,
}

impl Dsf {
    pub fn new(intensities: Vec<f64>, fvalue: f64) -> Self {
        Self {
            intensities,
            errors: None,
            fvalue,
        }
    }

    /// Caller guarantees `errors`, when present, matches `intensities` in length.
    pub(crate) fn from_parts(
        intensities: Vec<f64>,
        errors: Option<Vec<f64>>,
        fvalue: f64,
    ) -> Self {
        Self {
            intensities,
            errors,
            fvalue,
        }
    }

    pub fn with_errors(mut self, errors: Vec<f64>) -> DsfResult<Self> {
        self.set_errors(errors)?;
        Ok(self)
    }

    pub fn set_errors(&mut self, errors: Vec<f64>) -> DsfResult<()> {
        if errors.len() != self.intensities.len() {
            return Err(DsfError::input_validation(
                "INPUT.DSF_ERRORS",
                format!(
                    "DSF errors length {} does not match intensities length {}",
                    errors.len(),
                    self.intensities.len()
                ),
            ));
        }
        self.errors = Some(errors);
        Ok(())
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn errors(&self) -> Option<&[f64]> {
        self.errors.as_deref()
    }

    pub fn fvalue(&self) -> f64 {
        self.fvalue
    }

    pub fn channel_count(&self) -> usize {
        self.intensities.len()
    }

    pub fn into_intensities(self) -> Vec<f64> {
        self.intensities
    }
}

/// Ordered collection of DSFs sharing one channel grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DsfGroup {
    dsfs: Vec<Dsf>,
}

impl DsfGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dsf: Dsf) -> DsfResult<()> {
        if !dsf.fvalue.is_finite() {
            return Err(DsfError::input_validation(
                "INPUT.DSF_FVALUE",
                format!("DSF parameter value must be finite, got {}", dsf.fvalue),
            ));
        }
        if let Some(expected) = self.channel_count() {
            if dsf.channel_count() != expected {
                return Err(DsfError::input_validation(
                    "INPUT.DSF_CHANNELS",
                    format!(
                        "DSF for parameter value {} has {} channels, group expects {}",
                        dsf.fvalue,
                        dsf.channel_count(),
                        expected
                    ),
                ));
            }
        }
        self.dsfs.push(dsf);
        Ok(())
    }

    pub fn channel_count(&self) -> Option<usize> {
        self.dsfs.first().map(Dsf::channel_count)
    }

    pub fn len(&self) -> usize {
        self.dsfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dsfs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dsf> {
        self.dsfs.iter()
    }

    /// True when every member carries errors.
    pub fn has_errors(&self) -> bool {
        !self.dsfs.is_empty() && self.dsfs.iter().all(|dsf| dsf.errors.is_some())
    }
}
