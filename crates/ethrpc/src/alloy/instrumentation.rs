//! Transport layer that logs every JSON-RPC request going to the node and
//! records how long it took and whether the transport failed.

use {
    alloy::{
        rpc::json_rpc::{RequestPacket, ResponsePacket},
        transports::TransportError,
    },
    std::{
        pin::Pin,
        sync::Arc,
        task::{Context, Poll},
        time::Instant,
    },
    tower::{Layer, Service},
};

/// Instruments requests issued on behalf of the component `label`.
pub(crate) struct InstrumentationLayer {
    label: Arc<str>,
}

impl InstrumentationLayer {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<S> Layer<S> for InstrumentationLayer {
    type Service = InstrumentedTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InstrumentedTransport {
            inner,
            label: self.label.clone(),
            metrics: Metrics::get(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InstrumentedTransport<S> {
    inner: S,
    label: Arc<str>,
    metrics: &'static Metrics,
}

impl<S> Service<RequestPacket> for InstrumentedTransport<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
{
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<ResponsePacket, TransportError>> + Send>>;
    type Response = ResponsePacket;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let methods: Vec<String> = req
            .requests()
            .iter()
            .map(|request| {
                tracing::trace!(component = %self.label, ?request, "executing request");
                request.method().to_string()
            })
            .collect();
        for method in &methods {
            self.metrics
                .requests_inflight
                .with_label_values(&[&*self.label, method.as_str()])
                .inc();
        }

        let label = self.label.clone();
        let metrics = self.metrics;
        let start = Instant::now();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await;
            let elapsed = start.elapsed().as_secs_f64();
            let result = match &res {
                Ok(_) => "ok",
                Err(err) => {
                    tracing::debug!(component = %label, ?methods, ?err, "request failed");
                    "transport_error"
                }
            };
            for method in &methods {
                metrics
                    .requests_inflight
                    .with_label_values(&[&*label, method.as_str()])
                    .dec();
                metrics
                    .requests
                    .with_label_values(&[&*label, method.as_str(), result])
                    .inc();
                metrics
                    .requests_duration_seconds
                    .with_label_values(&[&*label, method.as_str()])
                    .observe(elapsed);
            }
            res
        })
    }
}

#[derive(prometheus_metric_storage::MetricStorage, Clone, Debug)]
#[metric(subsystem = "alloy_rpc")]
struct Metrics {
    /// Number of RPC requests waiting for a response.
    #[metric(labels("component", "method"))]
    requests_inflight: prometheus::IntGaugeVec,

    /// Number of finished RPC requests. Error responses of the node count as
    /// `ok`, only failures to get any response count as `transport_error`.
    #[metric(labels("component", "method", "result"))]
    requests: prometheus::IntCounterVec,

    /// Execution time for each RPC request (batches are measured as a whole).
    #[metric(labels("component", "method"))]
    requests_duration_seconds: prometheus::HistogramVec,
}

impl Metrics {
    fn get() -> &'static Self {
        Self::instance(observe::metrics::get_storage_registry())
            .expect("unexpected error getting metrics instance")
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            rpc::json_rpc::{Id, Request},
            transports::TransportErrorKind,
        },
        tower::ServiceExt,
    };

    fn request(method: &'static str) -> RequestPacket {
        RequestPacket::Single(Request::new(method, Id::Number(1), ()).serialize().unwrap())
    }

    #[tokio::test]
    async fn records_failed_requests_per_component() {
        let transport = tower::service_fn(|_: RequestPacket| async {
            Err::<ResponsePacket, _>(TransportErrorKind::backend_gone())
        });
        let service = InstrumentationLayer::new("instrumentation_test").layer(transport);

        let result = service.oneshot(request("eth_gasPrice")).await;

        assert!(result.is_err());
        let metrics = Metrics::get();
        let labels = ["instrumentation_test", "eth_gasPrice"];
        assert_eq!(
            metrics
                .requests
                .with_label_values(&[labels[0], labels[1], "transport_error"])
                .get(),
            1
        );
        assert_eq!(metrics.requests_inflight.with_label_values(&labels).get(), 0);
        assert_eq!(
            metrics
                .requests_duration_seconds
                .with_label_values(&labels)
                .get_sample_count(),
            1
        );
    }
}
