/// Default limit on nested projection inlining.
pub const DEFAULT_MAX_PROJECTION_DEPTH: usize = 64;

/// Tuning knobs for [`ProjectionExpander`](crate::ProjectionExpander).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandConfig {
    /// Maximum number of projection levels inlined inside one another before
    /// expansion fails with `CyclicProjection`. `usize::MAX` disables the guard.
    pub max_projection_depth: usize,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            max_projection_depth: DEFAULT_MAX_PROJECTION_DEPTH,
        }
    }
}

impl ExpandConfig {
    pub fn with_max_projection_depth(mut self, depth: usize) -> Self {
        self.max_projection_depth = depth;
        self
    }
}
