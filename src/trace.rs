use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		Aggregation, Instrument, MeterProviderBuilder, PeriodicReader, SdkMeterProvider, Stream,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use std::time::Duration;

use axum::http::Response;
use tracing::{level_filters::LevelFilter, Level, Span};
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The histogram fed by [`record_latency`].
const REQUEST_LATENCY: &str = "request_latency_ms";

/// Upper bounds of the latency buckets. Gemini and image uploads sit in the top ones.
const LATENCY_BOUNDARIES_MS: [f64; 12] = [
	1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

/// Response hook for `TraceLayer`. Logs the response and records its latency in
/// the `request_latency_ms` histogram when metrics are exported.
pub fn record_latency<B>(response: &Response<B>, latency: Duration, _span: &Span) {
	tracing::info!(
		histogram.request_latency_ms = latency.as_micros() as f64 / 1000.0,
		status = response.status().as_u16(),
		"finished processing request"
	);
}

/// Constructs a [`Resource`] which describes the service.
fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(
				DEPLOYMENT_ENVIRONMENT,
				if cfg!(debug_assertions) {
					"development"
				} else {
					"production"
				},
			),
		],
		SCHEMA_URL,
	)
}

/// Constructs an [`SdkMeterProvider`] with millisecond buckets for the request latency.
fn init_meter_provider() -> SdkMeterProvider {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)
		.expect("failed to build the OTLP metrics exporter");

	let reader = PeriodicReader::builder(exporter, runtime::Tokio)
		.with_interval(Duration::from_secs(5))
		.build();

	// For debugging in development
	#[cfg(debug_assertions)]
	let stdout_reader = PeriodicReader::builder(
		opentelemetry_stdout::MetricsExporter::default(),
		runtime::Tokio,
	)
	.build();

	let view_latency = |instrument: &Instrument| -> Option<Stream> {
		(instrument.name == REQUEST_LATENCY).then(|| {
			Stream::new()
				.name(REQUEST_LATENCY)
				.aggregation(Aggregation::ExplicitBucketHistogram {
					boundaries: LATENCY_BOUNDARIES_MS.to_vec(),
					record_min_max: true,
				})
		})
	};

	let meter_provider = MeterProviderBuilder::default();
	#[cfg(debug_assertions)]
	let meter_provider = meter_provider.with_reader(stdout_reader);

	let meter_provider = meter_provider
		.with_resource(resource())
		.with_reader(reader)
		.with_view(view_latency)
		.build();

	global::set_meter_provider(meter_provider.clone());

	meter_provider
}

/// Constructs a [`Tracer`] with a custom sampling strategy and exporter.
fn init_tracer() -> Tracer {
	opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(
			opentelemetry_sdk::trace::Config::default()
				.with_sampler(Sampler::TraceIdRatioBased(1.0))
				.with_resource(resource()),
		)
		.with_batch_config(BatchConfig::default())
		.with_exporter(opentelemetry_otlp::new_exporter().tonic())
		.install_batch(runtime::Tokio)
		.expect("failed to install the OTLP tracer")
}

/// Initializes the tracing subscriber.
///
/// With `otlp` set, spans and metrics are also exported over OTLP, and the
/// returned guard flushes the global tracer and meter provider when dropped.
pub fn init_tracing_subscriber(otlp: bool) -> Option<OtelGuard> {
	let registry = tracing_subscriber::registry()
		.with(LevelFilter::from_level(Level::INFO))
		.with(tracing_subscriber::fmt::layer().with_ansi(true));

	if !otlp {
		registry.init();
		return None;
	}

	let meter_provider = init_meter_provider();

	registry
		.with(MetricsLayer::new(meter_provider.clone()))
		.with(tracing_opentelemetry::layer().with_tracer(init_tracer()))
		.init();

	Some(OtelGuard { meter_provider })
}

pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(err) = self.meter_provider.shutdown() {
			eprintln!("{err:?}");
		}

		opentelemetry::global::shutdown_tracer_provider();
	}
}

#[cfg(test)]
mod test {
	use std::{
		sync::{Arc, Mutex},
		time::Duration,
	};

	use axum::{body::Body, http::Response};
	use tracing::field::{Field, Visit};
	use tracing_subscriber::{
		layer::{Context, SubscriberExt},
		Layer,
	};

	/// Collects `histogram.*` fields the way the metrics layer reads them.
	#[derive(Clone, Default)]
	struct Histograms(Arc<Mutex<Vec<(String, f64)>>>);

	struct Visitor<'a>(&'a mut Vec<(String, f64)>);

	impl Visit for Visitor<'_> {
		fn record_f64(&mut self, field: &Field, value: f64) {
			if let Some(name) = field.name().strip_prefix("histogram.") {
				self.0.push((name.to_string(), value));
			}
		}

		fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
	}

	impl<S: tracing::Subscriber> Layer<S> for Histograms {
		fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
			let mut recorded = self.0.lock().unwrap();

			event.record(&mut Visitor(&mut recorded));
		}
	}

	#[test]
	fn test_records_request_latency() {
		let histograms = Histograms::default();
		let subscriber = tracing_subscriber::registry().with(histograms.clone());
		let response = Response::builder().status(201).body(Body::empty()).unwrap();

		tracing::subscriber::with_default(subscriber, || {
			super::record_latency(&response, Duration::from_millis(12), &tracing::Span::none());
		});

		assert_eq!(
			*histograms.0.lock().unwrap(),
			[(super::REQUEST_LATENCY.to_string(), 12.0)]
		);
	}
}
