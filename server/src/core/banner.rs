//! Startup banner and URL display

use supports_hyperlinks::Stream;

use super::config::is_all_interfaces;
use super::constants::{APP_NAME, INGEST_PATH};

/// Wrap a URL in OSC 8 escape codes when the terminal supports hyperlinks
fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(Stream::Stdout) {
        format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, url)
    } else {
        url.to_string()
    }
}

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, backend_configured: bool, fallback_client: bool) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    // Label width: "Application Insights:" is 21 chars, pad to 22 for alignment
    const W: usize = 22;

    let ingest_url = format!("http://{}:{}{}", display_host, port, INGEST_PATH);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Ingestion:",
        terminal_link(&ingest_url)
    );

    let docs_url = format!("http://{}:{}/api/docs", display_host, port);
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "API docs:",
        terminal_link(&docs_url)
    );

    // Show network info based on bind address
    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        // Enumerate LAN IPs when binding to all interfaces
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}", ip, port);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}", host, port);
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            terminal_link(&network_url)
        );
    }

    let backend = match (backend_configured, fallback_client) {
        (true, true) => "configured",
        (true, false) => "configured (no fallback client)",
        (false, _) => "not configured, events are dropped",
    };
    println!(
        "  \x1b[90m➜  {:<W$} {}\x1b[0m",
        "Application Insights:", backend
    );

    println!();
}
