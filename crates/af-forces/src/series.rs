//! Trailing-window averaging and axis transforms.
//!
//! The solver stops on its own iteration policy, not on a formal
//! convergence report, so the mean over a trailing window of force records
//! stands in for the converged value.

use serde::Serialize;

use af_core::{AfError, AfResult};

use crate::parse::ForceSeries;

/// Per-component mean over a trailing window of records.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForceAverage {
    /// Records the mean was taken over.
    pub samples: usize,
    pub pressure: [f64; 3],
    pub viscous: [f64; 3],
    /// Mean total drag-axis force.
    pub drag: f64,
    /// Mean total lift-axis force.
    pub lift: f64,
}

impl ForceSeries {
    /// Mean of the last `window` records, per force component.
    ///
    /// Fails with `InsufficientData` when fewer than `window` records exist
    /// or the window is zero; callers decide whether to treat that as fatal
    /// or fall back to all available records.
    pub fn tail_average(&self, window: usize) -> AfResult<ForceAverage> {
        if window == 0 || self.records.len() < window {
            return Err(AfError::InsufficientData {
                needed: window.max(1),
                available: self.records.len(),
            });
        }

        let tail = &self.records[self.records.len() - window..];
        let n = tail.len() as f64;
        let mut pressure = [0.0f64; 3];
        let mut viscous = [0.0f64; 3];
        for rec in tail {
            for axis in 0..3 {
                pressure[axis] += rec.pressure[axis];
                viscous[axis] += rec.viscous[axis];
            }
        }
        for axis in 0..3 {
            pressure[axis] /= n;
            viscous[axis] /= n;
        }

        Ok(ForceAverage {
            samples: tail.len(),
            pressure,
            viscous,
            drag: pressure[0] + viscous[0],
            lift: pressure[2] + viscous[2],
        })
    }
}

/// Wind-axis (aircraft reference frame) lift and drag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindForces {
    pub lift: f64,
    pub drag: f64,
}

/// Rotate body-axis totals into the wind frame for an angle of attack in
/// degrees: the geometry was pitched, so the measured axes were too.
pub fn wind_axis(aoa_deg: f64, body_drag: f64, body_lift: f64) -> WindForces {
    let (sin_a, cos_a) = aoa_deg.to_radians().sin_cos();
    WindForces {
        lift: cos_a * body_lift + sin_a * body_drag,
        drag: cos_a * body_drag - sin_a * body_lift,
    }
}
