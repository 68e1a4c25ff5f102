use captive_dns_domain::{build_domain_table, CliOverrides, Config};
use captive_dns_server::{DnsResponder, UdpServer};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod bootstrap;

#[derive(Parser)]
#[command(name = "captive-dns")]
#[command(version)]
#[command(about = "Tiny authoritative DNS responder for captive-portal deployments")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// UDP port to serve on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = Config::load(cli.config.as_deref(), overrides)?;
    config.validate()?;

    bootstrap::init_logging(&config);
    info!("Starting captive-dns v{}", env!("CARGO_PKG_VERSION"));

    let table = build_domain_table(&config.domains)?;
    info!(
        domains = table.len(),
        ttl = config.dns.ttl,
        ignore_unknown = config.dns.ignore_unknown,
        "Domain table built"
    );

    let responder = Arc::new(DnsResponder::new(
        table,
        config.dns.ttl,
        config.dns.ignore_unknown,
    ));

    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;
    let socket = bootstrap::bind_udp_socket(addr)?;

    let shutdown = CancellationToken::new();
    let server = UdpServer::new(socket, responder, config.dns.max_packet_len)
        .with_cancellation(shutdown.clone());
    let server_task = tokio::spawn(server.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.cancel();
    server_task.await?;

    info!("Server shutdown complete");
    Ok(())
}
