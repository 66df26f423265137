use skyfi_climate::{MessageLogMode, SkyFiClient};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let host = args
        .get(1)
        .expect("usage: monitor <host> <password> [--log <path>]");
    let password = args.get(2).cloned().unwrap_or_default();
    let log_path = args
        .iter()
        .position(|a| a == "--log")
        .and_then(|i| args.get(i + 1));

    let mut builder = SkyFiClient::builder(host)
        .password(password)
        .on_event(|event| {
            println!("{event:?}");
        })
        .on_state_change(|state| {
            println!(
                "{:.1}\u{00b0}C (target {}) | outside {:.1}\u{00b0}C | mode: {} | fan: {}",
                state.current_temperature,
                state
                    .target_temperature
                    .map_or_else(|| "-".to_string(), |t| format!("{t:.1}")),
                state.outside_temperature,
                state.hvac_mode,
                state.fan_mode,
            );
        });

    if let Some(path) = log_path {
        println!("Logging wire traffic to {path}");
        builder = builder.message_log(MessageLogMode::Diffed, path);
    }

    let mut client = builder.build()?;

    println!("Polling {} at {host}...", client.name());
    loop {
        if let Err(e) = client.refresh().await {
            eprintln!("Refresh error: {e}");
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}
