//! Interpolation of a family of dynamic structure factors along the
//! parameter they were computed for.
//!
//! A [`DsfGroup`] is transposed into a [`ChannelGroup`] (one series per energy
//! channel, sorted by parameter value). Building the group's interpolator
//! optionally smooths every channel with a running local regression before
//! splining it; evaluation then yields a new [`Dsf`] at any parameter value.

mod channel;
mod channel_group;
mod dsf;

pub use channel::{Channel, ChannelInterpolator, InterpolatorConfig};
pub use channel_group::{ChannelGroup, ChannelGroupInterpolator};
pub use dsf::{Dsf, DsfGroup};
