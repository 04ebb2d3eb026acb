// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! DeadForest operator log server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deadforest_server::{create_app_state, create_router, init_tracing, ServerError};
use tower_http::cors::{Any, CorsLayer};

/// DeadForest server - operator log inspection over HTTP.
#[derive(Parser, Debug)]
#[command(
	name = "deadforest-server",
	about = "DeadForest operator log server",
	version
)]
struct Args {
	/// Path to a TOML config file (default: /etc/deadforest/server.toml)
	#[arg(long, env = "DEADFOREST_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => deadforest_server_config::load_config_with_file(path)?,
		None => deadforest_server_config::load_config()?,
	};

	// The buffer must exist before the subscriber so every record reaches it.
	let log_buffer = init_tracing(&config.logging)?;

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		operators = config.auth.operators.len(),
		"starting deadforest-server"
	);

	let state = create_app_state(&config, Some(log_buffer));
	let app = create_router(state).layer(
		CorsLayer::new()
			.allow_origin(Any)
			.allow_methods(Any)
			.allow_headers(Any),
	);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(
			listener,
			app.into_make_service_with_connect_info::<SocketAddr>(),
		) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
				return Err(e.into());
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
