use std::num::NonZeroUsize;

pub const DEFAULT_TOTAL_REQUESTS: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(value) => value,
    None => NonZeroUsize::MIN,
};
pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(value) => value,
    None => NonZeroUsize::MIN,
};

/// Substitutes for zero request counts or concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadDefaults {
    pub total_requests: NonZeroUsize,
    pub concurrency: NonZeroUsize,
}

impl Default for LoadDefaults {
    fn default() -> Self {
        Self {
            total_requests: DEFAULT_TOTAL_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Effective batch parameters.
///
/// Concurrency is not clamped to the request count; surplus workers simply
/// find no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    pub total_requests: usize,
    pub concurrency: usize,
}

impl LoadPlan {
    #[must_use]
    pub const fn resolve(total_requests: usize, concurrency: usize, defaults: LoadDefaults) -> Self {
        Self {
            total_requests: if total_requests == 0 {
                defaults.total_requests.get()
            } else {
                total_requests
            },
            concurrency: if concurrency == 0 {
                defaults.concurrency.get()
            } else {
                concurrency
            },
        }
    }
}
