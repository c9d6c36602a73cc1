// Only compile the UI module when the TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;

use feedboard::client::{DashboardClient, DEFAULT_BASE_URL};
use feedboard::store::PreferenceStore;

fn main() -> Result<()> {
    // Log to stderr so the alternate screen stays clean; RUST_LOG filters.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let base_url = args
        .get(1)
        .cloned()
        .or_else(|| env::var("FEEDBOARD_API").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let store = match env::var("FEEDBOARD_DATA_DIR") {
        Ok(dir) => PreferenceStore::new(dir),
        Err(_) => PreferenceStore::default_location(),
    };

    run_ui_mode(store, base_url)
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: PreferenceStore, base_url: String) -> Result<()> {
    let client = DashboardClient::new(base_url)?;
    tracing::info!(url = client.base_url(), dir = %store.dir().display(), "starting dashboard");

    let mut app = ui::App::new(store, client);
    app.refresh();
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: PreferenceStore, _base_url: String) -> Result<()> {
    eprintln!("TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
