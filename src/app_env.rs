/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application, in tracing-subscriber's
/// [EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html) syntax
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Address and port the HTTP server binds to. Defaults to 0.0.0.0:8082 when unset.
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service
/// would have an OpenTelemetry collector sidecar which directs spans to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service
/// would have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
