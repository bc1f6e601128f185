use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use send_sentry::delivery::{DeliveryClient, HttpTransport};
use send_sentry::dom::{Document, EventKind, Page};
use send_sentry::{Config, Interceptor, LogSink, Report, ReportSink};
use std::process;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn cli() -> Command {
    Command::new("send-sentry")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Outbound web mail monitor: detects sends in web mail clients and reports them")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/send-sentry.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and show the collector endpoint")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("replay")
                .long("replay")
                .value_name("HTML")
                .help("Replay a click against a saved compose page")
                .requires_all(["host", "click"])
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host name the saved page was served from, e.g. mail.google.com")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("click")
                .long("click")
                .value_name("SELECTOR")
                .help("Attribute selector of the element to click, e.g. [aria-label=\"Send\"]")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging, including extraction results")
                .action(ArgAction::SetTrue),
        )
}

/// Logs every report and remembers what the replayed click produced.
#[derive(Default)]
struct ReplaySink {
    captured: Mutex<Option<String>>,
}

impl ReportSink for ReplaySink {
    fn report(&self, report: Report) {
        if let Report::Extracted { summary, .. } = &report {
            if let Ok(mut captured) = self.captured.lock() {
                *captured = Some(summary.clone());
            }
        }
        LogSink.report(report);
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/send-sentry.yaml");
    let config = match Config::load(config_path).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        match config.mail_endpoint() {
            Ok(endpoint) => {
                println!("Collector endpoint: {endpoint}");
                println!("Agent id: {}", config.agent_id);
                println!("Sender: {}", config.sender);
                println!("Tenant key: {}", config.masked_tenant_key());
                println!("Configuration is valid.");
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {e:#}");
                process::exit(1);
            }
        }
        return;
    }

    if let Some(html_path) = matches.get_one::<String>("replay") {
        let host = matches.get_one::<String>("host").map(String::as_str).unwrap_or("");
        let click = matches.get_one::<String>("click").map(String::as_str).unwrap_or("");
        match replay(&config, html_path, host, click).await {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("No send intent detected for '{click}' on {host}");
                process::exit(2);
            }
            Err(e) => {
                eprintln!("Replay failed: {e:#}");
                process::exit(1);
            }
        }
        return;
    }

    let _ = cli().print_help();
    println!();
}

fn generate_default_config(path: &str) {
    match Config::default().to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Set tenant_api_key and backend_url before deploying.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

/// Load a saved page, click `selector` and wait for the delivery outcome.
async fn replay(config: &Config, html_path: &str, host: &str, selector: &str) -> anyhow::Result<bool> {
    use anyhow::Context;
    use send_sentry::dom::Dom;

    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("Failed to read page snapshot: {html_path}"))?;
    let document = Document::parse_html(&html);
    log::info!("Loaded {} elements from {html_path}", document.len());

    let sink = Arc::new(ReplaySink::default());
    let transport = HttpTransport::new(Duration::from_secs(config.timeout_seconds))?;
    let delivery = Arc::new(DeliveryClient::new(
        config.mail_endpoint()?,
        Arc::new(transport),
        sink.clone(),
    )?);
    log::info!("Delivering to {}", delivery.endpoint());

    let interceptor = Rc::new(Interceptor::new(
        host,
        config.identity(),
        delivery.clone(),
        sink.clone(),
    ));
    let mut page = Page::new(host, document);
    interceptor.install(&mut page);

    let target = page
        .document()
        .query_selector(selector)
        .with_context(|| format!("No element matches '{selector}'"))?;
    page.dispatch(EventKind::Click, target);
    drop(page);

    match Arc::try_unwrap(delivery) {
        Ok(delivery) => delivery.shutdown().await,
        Err(_) => log::warn!("Delivery client still shared, not waiting for completion"),
    }

    let captured = sink.captured.lock().ok().and_then(|captured| captured.clone());
    match captured {
        Some(summary) => {
            println!("Captured: {summary}");
            Ok(true)
        }
        None => Ok(false),
    }
}
