// THEORY:
// The `Ranker` is the final analysis layer. It takes one `EstimateRecord` per
// image and orders the corpus by how close each estimate came to pi.
//
// Ordering is a total order so that two runs over the same corpus always agree:
// - primary key: absolute error, ascending, compared with `f64::total_cmp`
// - tie break:   identifier, ascending (byte-wise lexicographic)
// Because the order is total and depends only on the records themselves, ranking
// an already ranked sequence returns it unchanged.
//
// Identifiers name images and must be unique; a duplicate is a caller bug and is
// reported as `InvalidInputError::DuplicateIdentifier` instead of being silently
// collapsed. An absolute error that is NaN or negative would sort ahead of every
// real error under `total_cmp`, so such a record is rejected with
// `InvalidInputError::InvalidError` before sorting. Top-K selection never
// faults: asking for more entries than exist returns the whole ranking.

pub mod ranker {
    use crate::core_modules::estimator::estimator::Estimate;
    use crate::error::InvalidInputError;
    use std::cmp::Ordering;
    use std::collections::HashSet;

    /// One image's estimate, keyed by its identifier. Immutable once built.
    #[derive(Debug, Clone, PartialEq)]
    pub struct EstimateRecord {
        identifier: String,
        estimate: f64,
        error: f64,
    }

    impl EstimateRecord {
        pub fn new(identifier: impl Into<String>, estimate: Estimate) -> Self {
            Self {
                identifier: identifier.into(),
                estimate: estimate.value,
                error: estimate.error,
            }
        }

        pub fn identifier(&self) -> &str {
            &self.identifier
        }

        /// The image's approximation of pi.
        pub fn estimate(&self) -> f64 {
            self.estimate
        }

        /// `|estimate − π|`, the ranking key.
        pub fn error(&self) -> f64 {
            self.error
        }
    }

    fn record_cmp(a: &EstimateRecord, b: &EstimateRecord) -> Ordering {
        a.error
            .total_cmp(&b.error)
            .then_with(|| a.identifier.cmp(&b.identifier))
    }

    /// Records ordered by ascending absolute error, then identifier.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct RankedResult {
        records: Vec<EstimateRecord>,
    }

    impl RankedResult {
        pub fn records(&self) -> &[EstimateRecord] {
            &self.records
        }

        pub fn into_records(self) -> Vec<EstimateRecord> {
            self.records
        }

        /// Identifiers in rank order.
        pub fn identifiers(&self) -> Vec<&str> {
            self.records.iter().map(EstimateRecord::identifier).collect()
        }

        /// The first `k` records, or all of them if `k` exceeds the ranking's length.
        pub fn top_k(&self, k: usize) -> &[EstimateRecord] {
            &self.records[..k.min(self.records.len())]
        }

        pub fn len(&self) -> usize {
            self.records.len()
        }

        pub fn is_empty(&self) -> bool {
            self.records.is_empty()
        }
    }

    /// Orders `records` by ascending absolute error with identifier as tie break.
    ///
    /// # Errors
    ///
    /// - `InvalidInputError::DuplicateIdentifier` naming the first repeated identifier.
    /// - `InvalidInputError::InvalidError` for a record whose error is NaN or negative.
    pub fn rank<I>(records: I) -> Result<RankedResult, InvalidInputError>
    where
        I: IntoIterator<Item = EstimateRecord>,
    {
        let mut records: Vec<EstimateRecord> = records.into_iter().collect();

        {
            let mut seen = HashSet::with_capacity(records.len());
            for record in &records {
                if record.error.is_nan() || record.error < 0.0 {
                    return Err(InvalidInputError::InvalidError {
                        identifier: record.identifier.clone(),
                        error: record.error,
                    });
                }
                if !seen.insert(record.identifier.as_str()) {
                    return Err(InvalidInputError::DuplicateIdentifier(
                        record.identifier.clone(),
                    ));
                }
            }
        }

        records.sort_by(record_cmp);
        Ok(RankedResult { records })
    }

    /// The first `min(k, len)` records of `ranked`.
    pub fn top_k(ranked: &RankedResult, k: usize) -> &[EstimateRecord] {
        ranked.top_k(k)
    }
}
