use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use colored::*;
use futures_util::future::join_all;
use tracing_subscriber::EnvFilter;

use snapclient_config::cli::{format_param, Args, Command};
use snapclient_config::ParamClient;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn report(ok: bool, what: &str) -> ExitCode {
    if ok {
        println!("{}", format!("  {what}: ok").bright_green());
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", format!("  {what}: failed").bright_red());
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Command::Completions { shell } = &args.command {
        clap_complete::generate(*shell, &mut Args::command(), "snapclient-config", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(args.verbose);

    let config = args.client_config()?;
    if config.backend.is_override() {
        eprintln!(
            "{}",
            format!("  device {} via backend {}", config.page_origin, config.backend).bright_blue()
        );
    }
    let client = ParamClient::new(config);

    let code = match &args.command {
        Command::Get { keys } => {
            let values = join_all(keys.iter().map(|k| client.get_parameter(k))).await;
            let mut any_ok = false;
            for (key, value) in keys.iter().zip(&values) {
                any_ok |= value.is_some();
                let line = format_param(key, value.as_ref());
                if value.is_some() {
                    println!("{line}");
                } else {
                    println!("{}", line.yellow());
                }
            }
            if any_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Set { key, value } => {
            report(client.set_parameter(key, value).await, &format!("set {key}"))
        }
        Command::Delete { key } => report(client.delete_parameter(key).await, &format!("delete {key}")),
        Command::Capabilities { tab } => match client.get_capabilities(*tab).await {
            Some(caps) => {
                println!("{}", serde_json::to_string_pretty(&caps)?);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("{}", format!("  capabilities ({tab}): unavailable").bright_red());
                ExitCode::FAILURE
            }
        },
        Command::Restart => report(client.restart().await, "restart"),
        Command::Completions { .. } => ExitCode::SUCCESS,
    };

    Ok(code)
}
