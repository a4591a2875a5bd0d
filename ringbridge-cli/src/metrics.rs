use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

lazy_static! {
    pub static ref TOOL_CALLS: IntCounterVec = register_int_counter_vec!(
        "bridge_tool_calls_total",
        "Total tool invocations forwarded to the protocol server",
        &["tool"]
    )
    .unwrap();
    pub static ref TOOL_ERRORS: IntCounterVec = register_int_counter_vec!(
        "bridge_tool_errors_total",
        "Tool invocations that failed at the transport level",
        &["tool"]
    )
    .unwrap();
    pub static ref RUN_DURATION: HistogramVec = register_histogram_vec!(
        "bench_run_duration_seconds",
        "Wall-clock time of benchmark executions",
        &["buffer_type"],
        vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0] // Buckets up to the default run timeout
    )
    .unwrap();
}

/// Start the metrics server in a background task.
pub fn start_metrics_server(port: u16) {
    // Force initialization of metrics
    lazy_static::initialize(&TOOL_CALLS);
    lazy_static::initialize(&TOOL_ERRORS);
    lazy_static::initialize(&RUN_DURATION);

    tokio::spawn(async move {
        let addr = format!("0.0.0.0:{}", port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => {
                tracing::info!("Metrics server starting on {}", addr);
                loop {
                    if let Ok((mut socket, _)) = listener.accept().await {
                        tokio::spawn(async move {
                            let body = metrics_handler();
                            let response = format!(
                                "HTTP/1.0 200 OK\r\nConnection: close\r\nContent-Length: {}\r\nContent-Type: text/plain\r\n\r\n{}",
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.flush().await;
                        });
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to bind metrics server: {}", e);
            }
        }
    });
}

fn metrics_handler() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
