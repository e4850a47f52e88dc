use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRouteRequest {
    pub route: Route,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub handles: Vec<Handle>,
    pub matches: Vec<Match>,
}

impl Route {
    /// A route proxying `hosts`/`paths` to `upstream_host:upstream_port` over HTTP.
    pub fn reverse_proxy(
        id: &str,
        upstream_host: &str,
        upstream_port: u32,
        hosts: &[&str],
        paths: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            handles: vec![Handle {
                reverse_proxy: Some(ReverseProxy {
                    transport: Some(Transport {
                        protocol: "http".to_string(),
                    }),
                    upstreams: vec![Upstream {
                        dial: Dial {
                            host: upstream_host.to_string(),
                            port: upstream_port,
                        },
                    }],
                }),
            }],
            matches: vec![Match {
                hosts: hosts.iter().map(|h| h.to_string()).collect(),
                paths: paths.iter().map(|p| p.to_string()).collect(),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Handle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_proxy: Option<ReverseProxy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseProxy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    pub upstreams: Vec<Upstream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    pub protocol: String, // "http" or "fastcgi"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upstream {
    pub dial: Dial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dial {
    pub host: String,
    pub port: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Match {
    pub hosts: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRouteReply {
    pub result: String, // "ok" or "error"
    pub message: String,
}

impl AddRouteReply {
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

pub struct InjectorClient {
    client: Client,
    injector_url: String,
}

impl InjectorClient {
    pub fn new(injector_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(injector_url, Duration::from_secs(1))
    }

    pub fn with_timeout(injector_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).no_proxy().build()?,
            injector_url: injector_url.trim_end_matches('/').to_string(),
        })
    }

    /// Add or replace a route.
    pub async fn add_route(&self, route: &Route) -> Result<AddRouteReply, Box<dyn std::error::Error + Send + Sync>> {
        let resp = self
            .client
            .post(format!("{}/routes", self.injector_url))
            .json(&AddRouteRequest { route: route.clone() })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Injector returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<AddRouteReply>(&text)?)
    }

    /// The injector's current Caddy config; `None` while it is not initialized.
    pub async fn get_config(&self) -> Result<Option<serde_json::Value>, reqwest::Error> {
        let resp = self
            .client
            .get(format!("{}/config", self.injector_url))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Ok(None);
        }
        resp.error_for_status()?.json().await.map(Some)
    }

    /// Add `route`, logging the outcome instead of returning it. Suited to
    /// [`periodically`].
    pub async fn register(&self, route: &Route) {
        match self.add_route(route).await {
            Ok(reply) if reply.is_ok() => tracing::info!(route_id = %route.id, "Route registered"),
            Ok(reply) => tracing::error!(route_id = %route.id, message = %reply.message, "Route refused"),
            Err(e) => tracing::error!(route_id = %route.id, error = %e, "Could not add route"),
        }
    }
}

/// Call `f` right away and then every `every` until `cancel` completes.
///
/// Keeps a route registered if the injector or Caddy start later or restart.
pub async fn periodically<C, F, Fut>(cancel: C, every: Duration, mut f: F)
where
    C: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(cancel);
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = &mut cancel => return,
            _ = ticker.tick() => f().await,
        }
    }
}
