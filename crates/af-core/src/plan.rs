//! Partition planning from requested and detected core counts.
//!
//! Pure computation; the caller acts on the resulting [`ExecutionPlan`].

use crate::error::{AfError, AfResult};

/// How to reconcile a request that exceeds availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionPolicy {
    /// Reduce the request to the detected core count, recording the clamp.
    #[default]
    Clamp,
    /// Fail with `InsufficientResources` instead of clamping.
    Strict,
}

/// Immutable result of one planning pass.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub requested: Option<usize>,
    pub detected: usize,
    /// Partition count actually used: always >= 1 and <= `detected`.
    pub effective: usize,
    pub clamped: bool,
    pub policy: PartitionPolicy,
}

impl ExecutionPlan {
    pub fn is_parallel(&self) -> bool {
        self.effective > 1
    }
}

/// Number of host cores, as reported by the OS.
pub fn detect_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(0)
}

/// Plan the partition count for one solve invocation.
///
/// `requested = None` means use all detected cores. A request of zero is
/// rejected; a request above availability is clamped or rejected per
/// `policy`.
pub fn plan(
    requested: Option<usize>,
    detected: usize,
    policy: PartitionPolicy,
) -> AfResult<ExecutionPlan> {
    if detected < 1 {
        return Err(AfError::NoResourcesDetected);
    }
    if requested == Some(0) {
        return Err(AfError::InsufficientResources {
            requested: 0,
            detected,
        });
    }

    let (effective, clamped) = match requested {
        None => (detected, false),
        Some(n) if n <= detected => (n, false),
        Some(n) => match policy {
            PartitionPolicy::Clamp => {
                tracing::warn!(
                    requested = n,
                    detected,
                    "requested partitions exceed detected cores, clamping"
                );
                (detected, true)
            }
            PartitionPolicy::Strict => {
                return Err(AfError::InsufficientResources {
                    requested: n,
                    detected,
                });
            }
        },
    };

    Ok(ExecutionPlan {
        requested,
        detected,
        effective,
        clamped,
        policy,
    })
}
