use super::channel::{Channel, ChannelInterpolator, InterpolatorConfig};
use super::dsf::{Dsf, DsfGroup};
use crate::domain::{DsfError, DsfResult};
use crate::numerics::deterministic_argsort;

/// A DSF group transposed into per-channel series sorted by parameter value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGroup {
    fvalues: Vec<f64>,
    channels: Vec<Channel>,
}

impl ChannelGroup {
    pub fn from_dsf_group(group: &DsfGroup) -> DsfResult<Self> {
        let Some(channel_count) = group.channel_count() else {
            return Err(DsfError::input_validation(
                "INPUT.DSF_GROUP_EMPTY",
                "cannot build a channel group from an empty DSF group",
            ));
        };

        let dsfs: Vec<&Dsf> = group.iter().collect();
        let raw_fvalues: Vec<f64> = dsfs.iter().map(|dsf| dsf.fvalue()).collect();
        let order = deterministic_argsort(&raw_fvalues);
        let fvalues: Vec<f64> = order.iter().map(|&index| raw_fvalues[index]).collect();

        if let Some(pair) = fvalues.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(DsfError::input_validation(
                "INPUT.DSF_DUPLICATE_FVALUE",
                format!("parameter value {} appears more than once", pair[0]),
            ));
        }

        let with_errors = group.has_errors();
        let channels = (0..channel_count)
            .map(|channel| {
                let intensities = order
                    .iter()
                    .map(|&index| dsfs[index].intensities()[channel])
                    .collect();
                let errors = with_errors.then(|| {
                    order
                        .iter()
                        .filter_map(|&index| dsfs[index].errors().map(|errors| errors[channel]))
                        .collect()
                });
                Channel::new(fvalues.clone(), intensities, errors)
            })
            .collect();

        Ok(Self { fvalues, channels })
    }

    pub fn fvalues(&self) -> &[f64] {
        &self.fvalues
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn build_interpolator(
        &self,
        config: InterpolatorConfig,
    ) -> DsfResult<ChannelGroupInterpolator> {
        let channels = self
            .channels
            .iter()
            .map(|channel| channel.build_interpolator(config))
            .collect::<DsfResult<Vec<_>>>()?;
        Ok(ChannelGroupInterpolator {
            fvalue_range: (self.fvalues[0], self.fvalues[self.fvalues.len() - 1]),
            config,
            channels,
        })
    }
}

/// Immutable interpolator over every channel of a [`ChannelGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGroupInterpolator {
    fvalue_range: (f64, f64),
    config: InterpolatorConfig,
    channels: Vec<ChannelInterpolator>,
}

impl ChannelGroupInterpolator {
    pub fn fvalue_range(&self) -> (f64, f64) {
        self.fvalue_range
    }

    pub fn config(&self) -> InterpolatorConfig {
        self.config
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Interpolated DSF at `fvalue`. Values outside the reference range are
    /// extrapolated from the end segments.
    pub fn evaluate(&self, fvalue: f64) -> Dsf {
        let intensities = self
            .channels
            .iter()
            .map(|channel| channel.value(fvalue))
            .collect();
        let errors = self
            .channels
            .iter()
            .map(|channel| channel.error(fvalue))
            .collect::<Option<Vec<f64>>>();
        Dsf::from_parts(intensities, errors, fvalue)
    }
}
