use mock_service::MockConfig;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init_tracing() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();
    ONCE_LOCK.get_or_init(|| {
        FmtSubscriber::builder()
            .with_env_filter("fanbench=debug,mock_service=debug,axum::rejection=trace")
            .init();
    });
}

/// Starts a mock service on an ephemeral port and returns its base URL.
/// Each caller gets an isolated instance, so tests never share state.
#[allow(unused)]
pub async fn spawn_mock(config: MockConfig) -> String {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no local addr");
    tokio::spawn(mock_service::serve(listener, config));
    format!("http://{addr}")
}
