use std::net::SocketAddr;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Override the configured listen address.
    #[arg(long)]
    pub http_addr: Option<SocketAddr>,
}
