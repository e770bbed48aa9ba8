use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// A boolean "is there a usable internet path right now" check, consulted
/// before every fetch attempt. Tests inject a fixed-answer probe.
pub trait ConnectivityProbe: Send + Sync {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

/// Production probe: a bounded TCP connect to a well-known anycast address.
#[derive(Clone)]
pub struct TcpProbe {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self {
            addr: "1.1.1.1:443".parse().expect("static address"),
            timeout: Duration::from_secs(3),
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::debug!("connectivity probe failed: {}", e);
                false
            }
            Err(_) => {
                log::debug!("connectivity probe timed out after {:?}", self.timeout);
                false
            }
        }
    }
}

/// Fixed-answer probe for tests and for forcing offline behavior.
#[derive(Clone)]
pub struct StaticProbe(pub bool);

impl ConnectivityProbe for StaticProbe {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}
