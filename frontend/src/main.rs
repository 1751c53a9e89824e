//! Descriptor emitter for external tooling.
//!
//! Prints the resolved dev-server descriptor as TOML, or the full
//! configuration snapshot as JSON with `--json`.

use sylvascan_frontend::{AppConfig, DevConfig};

fn main() {
    let as_json = std::env::args().any(|arg| arg == "--json");

    let result = if as_json {
        serde_json::to_string_pretty(&AppConfig::resolve()).map_err(|e| e.to_string())
    } else {
        DevConfig::resolve().to_toml().map_err(|e| e.to_string())
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
