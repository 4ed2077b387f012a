//! Nokia SR OS example
//!
//! Connects to a Classic CLI SR OS router, runs operational commands with
//! fallback candidates, a strict batch, and an optional config push.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example nokia_sros -- --host pe1 --user admin --password admin
//! ```
//!
//! Push a port description (changes the device):
//! ```bash
//! cargo run --example nokia_sros -- --host pe1 --password admin --describe 1/1/3 "uplink"
//! ```

use std::env;
use std::time::Duration;

use netpilot::{Command, ConfigScope, Driver, DriverBuilder, HostKeyVerification};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("=== netpilot Nokia SR OS Example ===\n");
    println!("Connecting to {}:{}...", args.host, args.port);

    let mut driver = DriverBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .vendor("sros")
        .timeout(Duration::from_secs(args.timeout))
        .host_key_verification(HostKeyVerification::Disabled)
        .build()?;

    driver.open().await?;
    println!("Connected (mode: {:?})\n", driver.session().current_mode());

    // Older releases lack "show system information"; fall back to uptime
    println!("--- Fallback Candidates ---\n");
    let output = driver
        .send(Command::from(["show system information", "show uptime"]))
        .await?;
    print_head(&output, 15);

    println!("\n--- Batch ---\n");
    match driver
        .cli(Command::from(["show system cpu", "show router interface"]))
        .await
    {
        Ok(results) => {
            for (command, output) in &results {
                println!("> {command}\n{}", "-".repeat(40));
                print_head(output, 10);
                println!();
            }
        }
        Err(e) => eprintln!("Batch failed: {e}"),
    }

    println!("--- Running Config ---\n");
    let snapshot = driver.get_config(ConfigScope::Running).await?;
    print_head(&snapshot.running, 20);

    if let Some((port, description)) = &args.describe {
        println!("\n--- Config Push ---\n");
        let transcript = driver
            .config_commands(Command::from(vec![
                format!("port {port}"),
                format!("description \"{description}\""),
            ]))
            .await?;
        println!("{transcript}");
        println!("{}", driver.save_config().await?);
    }

    println!("\nAlive: {}", driver.is_alive().await);
    driver.close().await?;
    println!("Done!");

    Ok(())
}

fn print_head(text: &str, lines: usize) {
    let head: Vec<&str> = text.lines().take(lines).collect();
    println!("{}", head.join("\n"));
    if text.lines().count() > lines {
        println!("... (truncated)");
    }
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
    describe: Option<(String, String)>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "admin".to_string());
        let mut password = String::new();
        let mut timeout = 30u64;
        let mut describe = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if let Some(v) = args.get(i) {
                        host = v.clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if let Some(v) = args.get(i) {
                        port = v.parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if let Some(v) = args.get(i) {
                        user = v.clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if let Some(v) = args.get(i) {
                        password = v.clone();
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if let Some(v) = args.get(i) {
                        timeout = v.parse().unwrap_or(30);
                    }
                }
                "--describe" => {
                    if let (Some(port), Some(text)) = (args.get(i + 1), args.get(i + 2)) {
                        describe = Some((port.clone(), text.clone()));
                    }
                    i += 2;
                }
                "--help" => {
                    println!("Usage: nokia_sros [OPTIONS]");
                    println!();
                    println!("Options:");
                    println!("  -h, --host <HOST>             Target host [default: localhost]");
                    println!("  -p, --port <PORT>             SSH port [default: 22]");
                    println!("  -u, --user <USER>             Username [default: $USER]");
                    println!("  -P, --password <PASS>         Password");
                    println!("  -t, --timeout <SECS>          Timeout in seconds [default: 30]");
                    println!("      --describe <PORT> <TEXT>  Set a port description and save");
                    std::process::exit(0);
                }
                other => eprintln!("Ignoring unknown argument: {other}"),
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            timeout,
            describe,
        }
    }
}
