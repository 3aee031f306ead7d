//! Interpolating fit functions over families of dynamic structure factors.

pub mod algorithms;
pub mod domain;
pub mod functions;
pub mod interp;
pub mod numerics;
pub mod workspace;
