//! SRV lookups via the [hickory-resolver](https://github.com/hickory-dns/hickory-dns) crate

use super::{SrvRecord, SrvResolver};
use crate::{Error, Result};
use futures::future::BoxFuture;
use hickory_resolver::TokioAsyncResolver;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// System DNS resolver.
///
/// The underlying resolver is built from the system configuration (`/etc/resolv.conf`
/// on Unix) on first use and shared between clones.
#[derive(Default, Clone)]
pub struct HickoryResolver {
    state: Arc<OnceCell<TokioAsyncResolver>>,
}

impl HickoryResolver {
    /// Create a resolver; no I/O happens until the first lookup
    pub fn new() -> Self {
        Self::default()
    }

    async fn resolver(&self) -> Result<&TokioAsyncResolver> {
        self.state
            .get_or_try_init(|| async {
                TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
                    Error::Discovery(format!("failed to read system DNS configuration: {}", e))
                })
            })
            .await
    }
}

impl SrvResolver for HickoryResolver {
    fn lookup_srv<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<SrvRecord>>> {
        Box::pin(async move {
            let resolver = self.resolver().await?;
            let lookup = resolver
                .srv_lookup(name)
                .await
                .map_err(|e| Error::Discovery(format!("SRV lookup for '{}' failed: {}", name, e)))?;

            Ok(lookup
                .iter()
                .map(|srv| SrvRecord {
                    target: srv.target().to_utf8().trim_end_matches('.').to_string(),
                    port: srv.port(),
                    priority: srv.priority(),
                    weight: srv.weight(),
                })
                .collect())
        })
    }
}

impl fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HickoryResolver")
            .field("initialized", &self.state.initialized())
            .finish()
    }
}
