//! Connection opener example
//!
//! Reads a JSON inventory, opens every device through [`ConnectionOpener`]
//! (IOS devices try Telnet before SSH) and prints their version output.
//!
//! ```bash
//! NETPILOT_USER=admin NETPILOT_PASSWORD=admin \
//!     cargo run --example inventory -- devices.json
//! ```
//!
//! `devices.json`:
//! ```json
//! [
//!   {"device": "core-rtr1", "vendor": "IOS"},
//!   {"device": "pe1", "vendor": "sros", "timeout_secs": 30}
//! ]
//! ```

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use netpilot::opener::BoxError;
use netpilot::{
    Command, ConnectionOpener, CredentialProvider, Credentials, DeviceTarget, Driver, OsClassifier,
};

/// Credentials from NETPILOT_USER / NETPILOT_PASSWORD.
struct EnvCredentials;

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn credentials(&self) -> Result<Credentials, BoxError> {
        let username = env::var("NETPILOT_USER")?;
        let password = env::var("NETPILOT_PASSWORD")?;
        Ok(Credentials::new(username, password))
    }
}

/// Classifier for inventories that always carry a vendor.
struct NoClassifier;

#[async_trait]
impl OsClassifier for NoClassifier {
    async fn classify(&self, device: &str, _format: &str) -> Result<String, BoxError> {
        Ok(format!("Unable to classify {device}: no vendor in inventory"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = env::args().nth(1).unwrap_or_else(|| "devices.json".to_string());
    let targets: Vec<DeviceTarget> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

    let opener = ConnectionOpener::new(Arc::new(EnvCredentials), Arc::new(NoClassifier));

    for target in &targets {
        println!("=== {} ===", target.device);
        let mut negotiated = match opener.open_negotiated(target).await {
            Ok(negotiated) => negotiated,
            Err(e) => {
                eprintln!("open failed: {e}\n");
                continue;
            }
        };
        println!("transport: {}", negotiated.transport);

        let driver = &mut negotiated.driver;
        match driver
            .send(Command::from(["show version", "show system information"]))
            .await
        {
            Ok(output) => println!("{}\n", output.lines().take(5).collect::<Vec<_>>().join("\n")),
            Err(e) => eprintln!("send failed: {e}\n"),
        }
        driver.close().await?;
    }

    Ok(())
}
