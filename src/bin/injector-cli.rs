use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use caddy_cfg_injector::api::types::{
    DialSpec, HandleSpec, MatchSpec, ReverseProxySpec, TransportSpec, UpstreamSpec,
};
use caddy_cfg_injector::api::{translate, AddRouteReply, AddRouteRequest, RouteSpec};
use caddy_cfg_injector::model::{ConfigDocument, DEFAULT_SERVER_KEY};

#[derive(Parser)]
#[command(name = "injector-cli")]
#[command(about = "Management CLI for the Caddy config injector", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:50051")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or replace a reverse-proxy route
    AddRoute {
        #[command(flatten)]
        route: RouteArgs,

        /// Re-send the route every N seconds, so it is picked up again if
        /// the injector or Caddy restarts
        #[arg(long)]
        repeat_secs: Option<u64>,

        /// Stop repeating after N seconds
        #[arg(long, requires = "repeat_secs")]
        for_secs: Option<u64>,
    },
    /// Print the injector's current Caddy config
    Config,
    /// Print injector status
    Status,
    /// Print a standalone Caddy config holding just this route
    Render {
        #[command(flatten)]
        route: RouteArgs,

        #[arg(long, default_value = DEFAULT_SERVER_KEY)]
        server_key: String,
    },
}

#[derive(Args)]
struct RouteArgs {
    /// Route id, unique within the Caddy config (usually a domain)
    #[arg(long)]
    id: String,

    #[arg(long, default_value = "localhost")]
    upstream_host: String,

    #[arg(long)]
    upstream_port: u32,

    /// http or fastcgi
    #[arg(long, default_value = "http")]
    protocol: String,

    /// Host to match; repeat for several
    #[arg(long = "match-host")]
    hosts: Vec<String>,

    /// Path to match; repeat for several
    #[arg(long = "match-path", default_value = "/*")]
    paths: Vec<String>,
}

impl RouteArgs {
    fn to_spec(&self) -> RouteSpec {
        RouteSpec {
            id: self.id.clone(),
            handles: vec![HandleSpec::reverse_proxy(ReverseProxySpec {
                transport: Some(TransportSpec {
                    protocol: Some(self.protocol.clone()),
                }),
                upstreams: vec![UpstreamSpec {
                    dial: DialSpec {
                        host: self.upstream_host.clone(),
                        port: self.upstream_port,
                    },
                }],
            })],
            matches: vec![MatchSpec {
                hosts: self.hosts.clone(),
                paths: self.paths.clone(),
            }],
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match cli.command {
        Commands::AddRoute {
            route,
            repeat_secs,
            for_secs,
        } => {
            let request = AddRouteRequest {
                route: route.to_spec(),
            };
            match repeat_secs {
                None => add_route(&client, &cli.url, &request).await?,
                Some(secs) => {
                    let deadline = for_secs.map(|s| tokio::time::Instant::now() + Duration::from_secs(s));
                    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
                    loop {
                        ticker.tick().await;
                        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                            break;
                        }
                        if let Err(e) = add_route(&client, &cli.url, &request).await {
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
        }
        Commands::Config => {
            let res = client.get(format!("{}/config", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client.get(format!("{}/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Render { route, server_key } => {
            let route = translate(&route.to_spec())?;
            let document = ConfigDocument::with_route(&server_key, route);
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}

async fn add_route(
    client: &reqwest::Client,
    url: &str,
    request: &AddRouteRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let reply: AddRouteReply = client
        .post(format!("{}/routes", url))
        .json(request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if reply.is_ok() {
        println!("{}", reply.message);
    } else {
        eprintln!("Error: {}", reply.message);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: injector returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
