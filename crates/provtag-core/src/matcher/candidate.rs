/// Eligible worker together with its specificity for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<W> {
    pub worker: W,
    /// Worker tags not required by the job; lower is a closer match.
    pub specificity: usize,
}

impl<W> Candidate<W> {
    #[inline]
    pub fn new(worker: W, specificity: usize) -> Self {
        Self {
            worker,
            specificity,
        }
    }
}
