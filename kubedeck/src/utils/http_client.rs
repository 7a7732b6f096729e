use std::{sync::OnceLock, time::Duration};

use tracing::{debug, warn};

/// User agent sent by every outbound client.
pub const USER_AGENT: &str = concat!("kubedeck/", env!("CARGO_PKG_VERSION"));

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the `reqwest::Client` shared by the outbound collaborators.
///
/// A zero `request_timeout` leaves requests without a client-side deadline.
pub fn build_client(request_timeout: Duration) -> reqwest::Client {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10));

    if request_timeout > Duration::ZERO {
        builder = builder.timeout(request_timeout);
    }

    builder.build().unwrap_or_else(|error| {
        warn!(error = %error, "Failed to create configured HTTP client; falling back to reqwest defaults");
        reqwest::Client::new()
    })
}
