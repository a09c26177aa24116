use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process;

mod cli;
mod config;
mod engine;
mod error;
mod metrics;
mod prober;
mod resolver;
mod scanner;
mod scheduler;
mod store;
mod types;
mod utils;
mod wordlist;

use cli::Args;
use engine::RustBruterEngine;

const BANNER: &str = r#"    ____             __  ____             __
   / __ \__  _______/ /_/ __ )_______  __/ /____  _____
  / /_/ / / / / ___/ __/ __  / ___/ / / / __/ _ \/ ___/
 / _, _/ /_/ (__  ) /_/ /_/ / /  / /_/ / /_/  __/ /
/_/ |_|\__,_/____/\__/_____/_/   \__,_/\__/\___/_/

         Fast Active Subdomain Enumeration
              Made with ❤️  and 🦀
         Authors: Daniel Alisom
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if !args.silent {
        println!("{}", BANNER);
    }
    if args.verbose {
        info!(
            "rustbruter {} (built {}, {})",
            env!("CARGO_PKG_VERSION"),
            env!("BUILD_TIME"),
            env!("GIT_HASH")
        );
    }

    let engine = match RustBruterEngine::new(args.clone()).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Enumeration failed: {}", e);
            process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if args.port_scan {
        let scan_output = args.scan_output.clone().unwrap_or_else(|| {
            Path::new(&engine.config().output_dir)
                .join(format!("{}_portscan.txt", report.domain))
        });

        match engine.run_port_scans(&report.dns_only, &scan_output).await {
            Ok(scanned) => info!(
                "Port scanning complete: {} hosts scanned. Results saved in {}",
                scanned,
                scan_output.display()
            ),
            Err(e) => {
                error!("Port scanning failed: {}", e);
                process::exit(1);
            }
        }
    }

    Ok(())
}
