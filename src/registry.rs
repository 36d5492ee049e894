use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram, Histogram};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

use crate::utils::{self, SECONDS_DURATION_BUCKETS};

/// Errors raised while setting up a [`MetricsRegistry`]. Any of them means the
/// process should not start serving.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid metric name {0:?}")]
    InvalidName(String),

    #[error("metric name {0:?} is registered more than once")]
    DuplicateName(String),

    #[error("invalid histogram buckets: {0}")]
    Buckets(#[from] BuildError),
}

#[derive(Debug, Clone)]
struct MetricNames {
    requests_total: String,
    response_status: String,
    duration: String,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    names: MetricNames,
}

/// Process-lifetime home of the three HTTP instruments.
///
/// Each registry owns its own Prometheus recorder, nothing is installed globally.
/// Cloning is cheap and every clone feeds the same series.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<Inner>,
}

impl MetricsRegistry {
    /// Registry with the default `test_app` names and [`SECONDS_DURATION_BUCKETS`].
    pub fn new() -> Result<Self, RegistryError> {
        Self::builder().build()
    }

    pub fn builder<'a>() -> MetricsRegistryBuilder<'a> {
        MetricsRegistryBuilder::new()
    }

    /// Start timing a request to `path`. The observation is recorded when the
    /// returned timer is consumed.
    pub fn start_timer(&self, path: &str) -> HistogramTimer {
        let histogram = self.with_recorder(|| {
            histogram!(self.inner.names.duration.clone(), "path" => path.to_owned())
        });
        HistogramTimer::new(histogram)
    }

    /// Count one completed request to `path`.
    pub fn record_request(&self, path: &str) {
        self.with_recorder(|| {
            counter!(self.inner.names.requests_total.clone(), "path" => path.to_owned())
                .increment(1);
        });
    }

    /// Count one response sent with `status`.
    pub fn record_status(&self, status: StatusCode) {
        self.with_recorder(|| {
            counter!(
                self.inner.names.response_status.clone(),
                "status" => status.as_u16().to_string()
            )
            .increment(1);
        });
    }

    /// Render every series in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }

    pub fn requests_total_name(&self) -> &str {
        &self.inner.names.requests_total
    }

    pub fn response_status_name(&self) -> &str {
        &self.inner.names.response_status
    }

    pub fn duration_name(&self) -> &str {
        &self.inner.names.duration
    }

    fn with_recorder<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.inner.recorder, f)
    }
}

/// Builder for [`MetricsRegistry`].
///
/// ## Example
/// ```rust
/// use axum_info_metrics::MetricsRegistry;
///
/// let registry = MetricsRegistry::builder()
///     .with_prefix("shop")
///     .with_duration_buckets(&[0.01, 0.1, 1.0])
///     .build()
///     .unwrap();
/// assert_eq!(registry.requests_total_name(), "shop_http_requests_total");
/// ```
#[derive(Clone, Default)]
pub struct MetricsRegistryBuilder<'a> {
    prefix: Option<String>,
    requests_total: Option<Cow<'a, str>>,
    response_status: Option<Cow<'a, str>>,
    duration: Option<Cow<'a, str>>,
    buckets: Option<&'a [f64]>,
}

impl<'a> MetricsRegistryBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a prefix for the metrics instead of `test_app`. This will use the following
    /// metric names:
    ///  - `{prefix}_http_requests_total`
    ///  - `{prefix}_response_status`
    ///  - `{prefix}_http_response_time_seconds`
    ///
    /// An empty prefix drops the namespace altogether. Names set explicitly with the
    /// `with_*_name` methods are not affected.
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'a, str>>) -> Self {
        self.prefix = Some(prefix.into().into_owned());
        self
    }

    pub fn with_requests_total_name(mut self, name: impl Into<Cow<'a, str>>) -> Self {
        self.requests_total = Some(name.into());
        self
    }

    pub fn with_response_status_name(mut self, name: impl Into<Cow<'a, str>>) -> Self {
        self.response_status = Some(name.into());
        self
    }

    pub fn with_duration_name(mut self, name: impl Into<Cow<'a, str>>) -> Self {
        self.duration = Some(name.into());
        self
    }

    /// Override the histogram buckets, in seconds.
    pub fn with_duration_buckets(mut self, buckets: &'a [f64]) -> Self {
        self.buckets = Some(buckets);
        self
    }

    /// Validate the names, build the recorder and describe the instruments.
    pub fn build(self) -> Result<MetricsRegistry, RegistryError> {
        let names = self.resolve_names()?;

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(names.duration.clone()),
                self.buckets.unwrap_or(SECONDS_DURATION_BUCKETS),
            )?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(names.requests_total.clone(), "Number of get requests.");
            describe_counter!(names.response_status.clone(), "Status of HTTP response");
            describe_histogram!(names.duration.clone(), "Duration of HTTP requests.");
        });

        tracing::debug!(
            requests_total = %names.requests_total,
            response_status = %names.response_status,
            duration = %names.duration,
            "registered http metrics"
        );

        Ok(MetricsRegistry {
            inner: Arc::new(Inner {
                recorder,
                handle,
                names,
            }),
        })
    }

    fn resolve_names(&self) -> Result<MetricNames, RegistryError> {
        let [requests_total, response_status, duration] =
            utils::default_names().map(|name| match &self.prefix {
                Some(prefix) => utils::with_prefix(prefix, name),
                None => name.to_owned(),
            });

        let names = MetricNames {
            requests_total: self
                .requests_total
                .as_deref()
                .map_or(requests_total, str::to_owned),
            response_status: self
                .response_status
                .as_deref()
                .map_or(response_status, str::to_owned),
            duration: self.duration.as_deref().map_or(duration, str::to_owned),
        };

        let all = [
            &names.requests_total,
            &names.response_status,
            &names.duration,
        ];
        for (i, name) in all.iter().enumerate() {
            if !utils::is_valid_metric_name(name) {
                return Err(RegistryError::InvalidName((*name).clone()));
            }
            if all[..i].contains(name) {
                return Err(RegistryError::DuplicateName((*name).clone()));
            }
        }
        Ok(names)
    }
}

/// Start timestamp bound to one histogram series.
///
/// Consumed by [`HistogramTimer::observe_duration`], so a request can only ever
/// record one observation.
#[must_use = "the duration is only recorded when `observe_duration` is called"]
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl HistogramTimer {
    fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: Instant::now(),
        }
    }

    /// Record the time elapsed since the timer started and return it.
    pub fn observe_duration(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.histogram.record(elapsed.as_secs_f64());
        elapsed
    }
}
