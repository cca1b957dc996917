//! Batched elevation sampling.
//!
//! [`ElevationSampler`] splits a [`SampleGrid`] into row-major batches, sends
//! them to an [`ElevationProvider`] one after another and stitches the
//! answers back into an [`ElevationGrid`].
//!
//! The fetch is all-or-nothing: the first batch that fails (after retries
//! for transient errors) aborts the whole grid, and no later batches are
//! sent.

use std::time::Duration;

use crate::error::{PeakGridError, Result};
use crate::grid::{ElevationGrid, LatLon, SampleGrid};
use crate::provider::ElevationProvider;

/// Default number of locations per request.
///
/// The API accepts up to 512, but long URLs get rejected well before that.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Batching and retry settings.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Locations per request.
    pub batch_size: usize,
    /// Extra attempts per batch after a transient failure.
    pub max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n × retry_delay`.
    pub retry_delay: Duration,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            batch_delay: Duration::from_millis(100),
        }
    }
}

impl SamplerConfig {
    /// Set the number of locations per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Set the pause between batches.
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Number of requests needed for `points` locations.
    pub fn batch_count(&self, points: usize) -> usize {
        points.div_ceil(self.batch_size.max(1))
    }
}

/// Fetches complete elevation grids from a provider.
///
/// # Example
///
/// ```ignore
/// use peakgrid::{ApiConfig, ElevationSampler, GoogleElevationApi, GridConfig, PeakCatalog, SampleGrid, SamplerConfig};
///
/// let api = GoogleElevationApi::new(ApiConfig::from_env()?)?;
/// let sampler = ElevationSampler::new(api, SamplerConfig::default())?;
///
/// let catalog = PeakCatalog::eight_thousanders();
/// let grid = SampleGrid::around(catalog.resolve("K2")?, &GridConfig::default())?;
/// let elevations = sampler.fetch(&grid)?;
/// println!("Highest sample: {:.1} m", elevations.max());
/// ```
pub struct ElevationSampler<P> {
    provider: P,
    config: SamplerConfig,
}

impl<P: ElevationProvider> ElevationSampler<P> {
    /// Create a new sampler.
    ///
    /// # Errors
    ///
    /// Returns [`PeakGridError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(provider: P, config: SamplerConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(PeakGridError::InvalidBatchSize { size: 0 });
        }
        Ok(Self { provider, config })
    }

    /// The sampler's configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch elevations for every sample in `grid`.
    pub fn fetch(&self, grid: &SampleGrid) -> Result<ElevationGrid> {
        self.fetch_with_progress(grid, |_, _| {})
    }

    /// Fetch elevations, calling `progress(done, total)` after each batch.
    pub fn fetch_with_progress(
        &self,
        grid: &SampleGrid,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<ElevationGrid> {
        let points = grid.points();
        let total = self.config.batch_count(points.len());
        let mut elevations = Vec::with_capacity(points.len());

        tracing::debug!(
            points = points.len(),
            batches = total,
            batch_size = self.config.batch_size,
            "Fetching elevation grid"
        );

        for (i, batch) in points.chunks(self.config.batch_size).enumerate() {
            if i > 0 && !self.config.batch_delay.is_zero() {
                std::thread::sleep(self.config.batch_delay);
            }

            let values = self.fetch_batch(batch, i)?;
            if values.len() != batch.len() {
                return Err(PeakGridError::InvalidResponse {
                    reason: format!(
                        "batch {} requested {} locations, got {} elevations",
                        i + 1,
                        batch.len(),
                        values.len()
                    ),
                });
            }
            elevations.extend(values);

            tracing::debug!(batch = i + 1, of = total, "Fetched batch");
            progress(i + 1, total);
        }

        ElevationGrid::from_row_major(grid.size(), elevations)
    }

    /// One batch with retries on transient errors.
    fn fetch_batch(&self, batch: &[LatLon], index: usize) -> Result<Vec<f64>> {
        let mut attempt = 0;
        loop {
            match self.provider.lookup(batch) {
                Ok(values) => return Ok(values),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        batch = index + 1,
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Retrying elevation request"
                    );
                    std::thread::sleep(self.config.retry_delay * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::grid::{GridConfig, LatLon};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Provider returning canned results and recording every request.
    struct MockProvider {
        responses: RefCell<VecDeque<Result<Vec<f64>>>>,
        requests: RefCell<Vec<Vec<LatLon>>>,
    }

    impl MockProvider {
        fn new(responses: Vec<Result<Vec<f64>>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl ElevationProvider for MockProvider {
        fn lookup(&self, locations: &[LatLon]) -> Result<Vec<f64>> {
            self.requests.borrow_mut().push(locations.to_vec());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request #{}", self.request_count()))
        }
    }

    /// Provider computing a value from each coordinate.
    struct FnProvider<F> {
        f: F,
        calls: Cell<usize>,
    }

    impl<F: Fn(LatLon) -> f64> ElevationProvider for FnProvider<F> {
        fn lookup(&self, locations: &[LatLon]) -> Result<Vec<f64>> {
            self.calls.set(self.calls.get() + 1);
            Ok(locations.iter().map(|&p| (self.f)(p)).collect())
        }
    }

    fn fast_config() -> SamplerConfig {
        SamplerConfig::default()
            .with_retry_delay(Duration::ZERO)
            .with_batch_delay(Duration::ZERO)
    }

    fn grid_3x3() -> SampleGrid {
        SampleGrid::new(LatLon::new(27.9881, 86.925), &GridConfig::new(3, 0.075)).unwrap()
    }

    fn auth_error() -> PeakGridError {
        PeakGridError::Auth {
            message: "The provided API key is invalid.".to_string(),
        }
    }

    fn transient_error() -> PeakGridError {
        PeakGridError::TransientNetwork {
            reason: "connection reset".to_string(),
        }
    }

    #[test]
    fn test_positions_match_sample_grid() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![Ok(vec![
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0,
        ])]);
        let sampler = ElevationSampler::new(&provider, fast_config()).unwrap();

        let elevations = sampler.fetch(&grid).unwrap();

        let sent = provider.requests.borrow();
        assert_eq!(sent.len(), 1);
        for row in 0..3 {
            for col in 0..3 {
                let i = row * 3 + col;
                assert_eq!(sent[0][i], grid.get(row, col));
                assert_eq!(elevations.get(row, col), (i + 1) as f64);
            }
        }
    }

    #[test]
    fn test_batches_preserve_order() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![
            Ok(vec![1.0, 2.0, 3.0, 4.0]),
            Ok(vec![5.0, 6.0, 7.0, 8.0]),
            Ok(vec![9.0]),
        ]);
        let sampler =
            ElevationSampler::new(&provider, fast_config().with_batch_size(4)).unwrap();

        let mut seen = Vec::new();
        let elevations = sampler
            .fetch_with_progress(&grid, |done, total| seen.push((done, total)))
            .unwrap();

        assert_eq!(provider.request_count(), 3);
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(elevations.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(elevations.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(elevations.row(2), &[7.0, 8.0, 9.0]);

        let sent = provider.requests.borrow();
        assert_eq!(sent[1][0], grid.get(1, 1));
        assert_eq!(sent[2][0], grid.get(2, 2));
    }

    #[test]
    fn test_value_follows_coordinate() {
        let grid = SampleGrid::new(LatLon::new(0.0, 0.0), &GridConfig::new(7, 1.0)).unwrap();
        let provider = FnProvider {
            f: |p: LatLon| p.lat * 1000.0 + p.lon,
            calls: Cell::new(0),
        };
        let sampler =
            ElevationSampler::new(provider, fast_config().with_batch_size(5)).unwrap();

        let elevations = sampler.fetch(&grid).unwrap();

        assert_eq!(sampler.provider().calls.get(), 10);
        for row in 0..7 {
            for col in 0..7 {
                let p = grid.get(row, col);
                assert_eq!(elevations.get(row, col), p.lat * 1000.0 + p.lon);
            }
        }
    }

    #[test]
    fn test_auth_error_stops_immediately() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![Err(auth_error())]);
        let sampler =
            ElevationSampler::new(&provider, fast_config().with_batch_size(2)).unwrap();

        let err = sampler.fetch(&grid).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("GOOGLE_MAPS_API_KEY"));
        assert_eq!(provider.request_count(), 1);
    }

    #[test]
    fn test_quota_error_is_not_retried() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![
            Ok(vec![1.0; 5]),
            Err(PeakGridError::QuotaOrPermission {
                status: "OVER_QUERY_LIMIT".to_string(),
                message: "You have exceeded your rate-limit for this API.".to_string(),
            }),
        ]);
        let sampler =
            ElevationSampler::new(&provider, fast_config().with_batch_size(5)).unwrap();

        let err = sampler.fetch(&grid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaOrPermission);
        assert_eq!(provider.request_count(), 2);
    }

    #[test]
    fn test_transient_error_is_retried() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Ok((1..=9).map(f64::from).collect()),
        ]);
        let sampler = ElevationSampler::new(&provider, fast_config()).unwrap();

        let elevations = sampler.fetch(&grid).unwrap();
        assert_eq!(provider.request_count(), 3);
        assert_eq!(elevations.get(2, 2), 9.0);

        // Every attempt re-sends the same batch
        let sent = provider.requests.borrow();
        assert_eq!(sent[0], sent[2]);
    }

    #[test]
    fn test_retries_are_bounded() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Err(transient_error()),
        ]);
        let sampler =
            ElevationSampler::new(&provider, fast_config().with_max_retries(2)).unwrap();

        let err = sampler.fetch(&grid).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(provider.request_count(), 3);
    }

    #[test]
    fn test_short_batch_aborts() {
        let grid = grid_3x3();
        let provider = MockProvider::new(vec![Ok(vec![1.0, 2.0])]);
        let sampler = ElevationSampler::new(&provider, fast_config()).unwrap();

        let err = sampler.fetch(&grid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_zero_batch_size() {
        let provider = MockProvider::new(vec![]);
        let result = ElevationSampler::new(&provider, fast_config().with_batch_size(0));
        assert!(matches!(
            result,
            Err(PeakGridError::InvalidBatchSize { size: 0 })
        ));
    }

    #[test]
    fn test_batch_count() {
        let config = SamplerConfig::default();
        assert_eq!(config.batch_count(2500), 25);
        assert_eq!(config.batch_count(2501), 26);
        assert_eq!(config.batch_count(9), 1);
        assert_eq!(config.with_batch_size(4).batch_count(9), 3);
    }
}
