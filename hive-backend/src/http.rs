use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global shared HTTP client singleton.
///
/// Every engine instance reuses the same connection pool; `Client::clone()`
/// is just an `Arc` increment. Auth headers are attached per-request.
///
/// Engine streams carry no timeout of their own: a response is read for as
/// long as the engine keeps producing. Only connection establishment is
/// bounded here.
static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create shared HTTP client")
});

/// Returns a reference to the global shared HTTP client.
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
