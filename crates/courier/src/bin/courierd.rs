// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `courierd` — the Courier daemon process (§4.K). Not meant to be invoked
//! directly: `ProcessHandle::start` spawns it as a sibling of the host
//! binary, passing the project root as its only positional argument.

use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let project_root = match args.next() {
        Some(raw) => PathBuf::from(raw),
        None => {
            eprintln!("usage: courierd <project_root>");
            std::process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    if let Err(err) = weft_courier::daemon::run(project_root).await {
        tracing::error!(%err, "courier daemon exited with error");
        std::process::exit(1);
    }
}
