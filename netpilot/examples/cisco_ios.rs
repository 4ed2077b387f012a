//! Cisco IOS candidate configuration example
//!
//! Stages a candidate configuration file, shows the diff, and either
//! commits it or discards it.
//!
//! # Usage
//!
//! ```bash
//! # Replace the running config with candidate.cfg, dry run
//! cargo run --example cisco_ios -- --host r1 --password admin --replace candidate.cfg
//!
//! # Merge ntp.cfg and commit it
//! cargo run --example cisco_ios -- --host r1 --password admin --merge ntp.cfg --commit
//! ```

use std::env;
use std::path::PathBuf;

use netpilot::{CandidateSource, Driver, DriverBuilder, HostKeyVerification, TransportKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let Some(candidate) = args.replace.clone().or_else(|| args.merge.clone()) else {
        eprintln!("Error: Must provide either --replace or --merge");
        std::process::exit(1);
    };

    let mut builder = DriverBuilder::new(&args.host)
        .username(&args.user)
        .password(&args.password)
        .vendor("ios")
        .host_key_verification(HostKeyVerification::Disabled);
    if args.telnet {
        builder = builder.transport(TransportKind::Telnet);
    }
    let mut driver = builder.build()?;

    driver.open().await?;
    println!("Connected to {} over {:?}\n", args.host, driver.transport());

    let source = CandidateSource::File(candidate);
    if args.replace.is_some() {
        driver.load_replace_candidate(source).await?;
    } else {
        driver.load_merge_candidate(source).await?;
    }

    let diff = driver.compare_config().await?;
    if diff.is_empty() {
        println!("No changes.");
        driver.discard_config().await?;
    } else if args.commit {
        println!("Applying:\n{diff}\n");
        driver.commit_config("netpilot example").await?;
        println!("Committed; state {:?}", driver.config_state());
    } else {
        println!("Would apply:\n{diff}\n");
        driver.discard_config().await?;
        println!("Discarded (pass --commit to apply)");
    }

    driver.close().await?;
    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    user: String,
    password: String,
    telnet: bool,
    replace: Option<PathBuf>,
    merge: Option<PathBuf>,
    commit: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Args {
            host: "localhost".to_string(),
            user: env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            password: String::new(),
            telnet: false,
            replace: None,
            merge: None,
            commit: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => {
                    parsed.host = value.unwrap_or(parsed.host);
                    i += 1;
                }
                "--user" | "-u" => {
                    parsed.user = value.unwrap_or(parsed.user);
                    i += 1;
                }
                "--password" | "-P" => {
                    parsed.password = value.unwrap_or_default();
                    i += 1;
                }
                "--replace" => {
                    parsed.replace = value.map(PathBuf::from);
                    i += 1;
                }
                "--merge" => {
                    parsed.merge = value.map(PathBuf::from);
                    i += 1;
                }
                "--telnet" => parsed.telnet = true,
                "--commit" => parsed.commit = true,
                other => eprintln!("Ignoring unknown argument: {other}"),
            }
            i += 1;
        }
        parsed
    }
}
