// THEORY:
// Summary statistics describe the whole corpus of estimates at once: where the
// photos' approximations of pi cluster (mean) and how widely they spread
// (standard deviation). They are computed in a single pass with Welford's
// online update, which avoids the cancellation error of the naive
// sum-of-squares formula when estimates sit close together.
//
// The standard deviation is the population form (divide by n). An empty record
// set has no statistics at all and yields `None` rather than NaN.

pub mod statistics {
    use crate::core_modules::ranker::ranker::EstimateRecord;

    /// Online estimator for the mean and variance of scalar samples.
    #[derive(Debug, Clone, Default)]
    pub struct Welford {
        count: usize,
        mean: f64,
        m2: f64,
    }

    impl Welford {
        pub fn new() -> Self {
            Self::default()
        }

        /// Incorporate one new sample.
        pub fn update(&mut self, x: f64) {
            self.count += 1;
            let delta = x - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (x - self.mean);
        }

        /// Population variance. `None` until at least one sample.
        pub fn variance(&self) -> Option<f64> {
            (self.count > 0).then(|| self.m2 / self.count as f64)
        }

        pub fn summary(&self) -> Option<SummaryStatistics> {
            let variance = self.variance()?;
            Some(SummaryStatistics {
                count: self.count,
                mean: self.mean,
                std_dev: variance.sqrt(),
            })
        }
    }

    /// Mean and spread of a corpus's estimates.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct SummaryStatistics {
        pub count: usize,
        pub mean: f64,
        /// Population standard deviation.
        pub std_dev: f64,
    }

    /// Mean and population standard deviation of the estimate values in `records`.
    pub fn summary_statistics<'a, I>(records: I) -> Option<SummaryStatistics>
    where
        I: IntoIterator<Item = &'a EstimateRecord>,
    {
        let mut welford = Welford::new();
        for record in records {
            welford.update(record.estimate());
        }
        welford.summary()
    }
}
