/// Running (weighted) mean
#[derive(Debug, Clone, Default)]
pub struct Averager {
    pub mean: f64,
    /// Accumulated weight
    pub weight: f64,
    pub count: u64,
}

impl Averager {
    /// Builds new Averager
    pub fn new() -> Self {
        Self::default()
    }

    /// Push new value into [Averager], with unit weight
    pub fn add(&mut self, x: f64) {
        self.add_weighted(x, 1.0);
    }

    /// Push new value into [Averager]. Null (or negative) weights are ignored.
    pub fn add_weighted(&mut self, x: f64, w: f64) {
        if w <= 0.0 {
            return;
        }
        self.count += 1;
        self.weight += w;
        self.mean += (x - self.mean) * w / self.weight;
    }

    /// Returns mean, if at least one value contributed
    pub fn value(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.mean)
        } else {
            None
        }
    }
}
