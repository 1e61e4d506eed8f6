use engine::PositionKey;

/// A position after the driver has visited and backed it up.
#[derive(Clone, Debug, PartialEq)]
pub struct PlyReport {
    pub key: PositionKey,
    pub value: f64,
    pub visit_count: u32,
    pub reference: f64,
    pub successors: usize,
}

type ActionAndReport<A> = (A, PlyReport);

#[derive(Debug)]
pub struct SelfPlayMetrics<A, T> {
    root: PlyReport,
    analysis: Vec<ActionAndReport<A>>,
    score: T,
}

impl<A, T> SelfPlayMetrics<A, T> {
    pub fn new(root: PlyReport, analysis: Vec<ActionAndReport<A>>, score: T) -> Self {
        Self {
            root,
            analysis,
            score,
        }
    }

    pub fn into_inner(self) -> (PlyReport, Vec<ActionAndReport<A>>, T) {
        (self.root, self.analysis, self.score)
    }

    pub fn root(&self) -> &PlyReport {
        &self.root
    }

    pub fn analysis(&self) -> &[ActionAndReport<A>] {
        &self.analysis
    }

    pub fn score(&self) -> &T {
        &self.score
    }
}
