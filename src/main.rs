//! PasteBridge diagnostics CLI.
//!
//! Exercises each adapter of the detected platform from the command line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pastebridge::config::{Config, ConfigError};
use pastebridge::delivery::{self, DeliveryOptions};
use pastebridge::platform::capability::Advice;
use pastebridge::platform::{
    AdapterBundle, AdapterContext, AdapterFactory, Backends, Capabilities, CapabilityReport,
    MenuItem, PlatformDescriptor,
};

#[derive(Parser)]
#[command(name = "pastebridge", version, about = "Platform adapter diagnostics")]
struct Cli {
    /// Config file (default: <config dir>/pastebridge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the detected platform, capabilities and mechanisms
    Probe {
        #[arg(long)]
        json: bool,
    },
    /// Put TEXT on the clipboard
    Copy { text: String },
    /// Send the platform paste keystroke
    Paste,
    /// Send Ctrl+Enter
    CtrlEnter,
    /// Type TEXT without the clipboard
    Type { text: String },
    /// Tap Scroll Lock periodically to keep the session awake
    KeepAlive {
        /// Number of rounds (0 = forever)
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,
    },
    /// Play the notification sound
    Sound,
    /// Copy, paste and notify, like a request from the phone
    Deliver {
        text: String,
        /// Send Ctrl+Enter after pasting
        #[arg(long)]
        submit: bool,
    },
    /// Show the tray icon until Quit is chosen
    Tray,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeReport<'a> {
    descriptor: &'a PlatformDescriptor,
    capabilities: CapabilityReport,
    recommendations: Advice,
    fallbacks: Advice,
    bundle: String,
    keyboard_methods: Vec<String>,
    clipboard_tool: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let factory = AdapterFactory::new(AdapterContext {
        backends: Backends::default(),
        settings: config.adapter_settings(),
    });
    let bundle = factory.create_adapters(None);

    if run(cli.command, &config, &bundle) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn fail(e: &ConfigError) -> ExitCode {
    log::error!("{e}");
    ExitCode::from(2)
}

fn run(command: Command, config: &Config, bundle: &AdapterBundle) -> bool {
    match command {
        Command::Probe { json } => probe(bundle, json),
        Command::Copy { text } => report("copy", bundle.clipboard.copy_text(&text)),
        Command::Paste => report("paste", bundle.keyboard.send_paste_command()),
        Command::CtrlEnter => report("ctrl-enter", bundle.keyboard.send_ctrl_enter()),
        Command::Type { text } => report("type", bundle.keyboard.send_text(&text)),
        Command::KeepAlive { count } => keep_alive(config, bundle, count),
        Command::Sound => report("sound", bundle.notifications.play_notification_sound()),
        Command::Deliver { text, submit } => {
            let options = DeliveryOptions {
                submit: submit || config.delivery.auto_submit,
                play_sound: config.notifications.enabled,
                ..DeliveryOptions::default()
            };
            let outcome = delivery::deliver(bundle, &text, &options);
            println!("{outcome}");
            outcome.is_success()
        }
        Command::Tray => tray(bundle),
    }
}

fn report(operation: &str, ok: bool) -> bool {
    println!("{operation}: {}", if ok { "ok" } else { "failed" });
    ok
}

fn probe(bundle: &AdapterBundle, json: bool) -> bool {
    let descriptor = &bundle.descriptor;
    let caps = Capabilities::new(descriptor);
    let report = ProbeReport {
        descriptor,
        capabilities: caps.report(),
        recommendations: caps.recommended_approaches(),
        fallbacks: caps.fallback_methods(),
        bundle: bundle.kind.to_string(),
        keyboard_methods: bundle.keyboard.available_methods(),
        clipboard_tool: bundle.clipboard.preferred_tool(),
    };

    if json {
        return match serde_json::to_string_pretty(&report) {
            Ok(s) => {
                println!("{s}");
                true
            }
            Err(e) => {
                log::error!("probe: {e}");
                false
            }
        };
    }

    let or_none = |v: Option<String>| v.unwrap_or_else(|| "none".into());
    let inventory = &descriptor.tool_inventory;
    println!("os:          {} {}", descriptor.os_family, descriptor.os_version);
    println!("display:     {}", or_none(descriptor.display_protocol.map(|p| p.to_string())));
    println!("desktop:     {}", or_none(descriptor.desktop_environment.map(|d| d.to_string())));
    println!("wsl:         {}", descriptor.is_wsl);
    println!("keyboard:    [{}]", inventory.keyboard_tools.join(", "));
    println!("clipboard:   [{}]", inventory.clipboard_tools.join(", "));
    println!("audio:       [{}]", inventory.audio_players.join(", "));
    println!("libraries:   {:?}", inventory.libraries);
    println!();
    println!("bundle:      {}", report.bundle);
    println!("key chain:   [{}]", report.keyboard_methods.join(", "));
    println!("clip tool:   {}", or_none(report.clipboard_tool));
    println!();
    for (feature, level) in &report.capabilities {
        println!("{:<20} {level:?}", feature.key());
    }
    print_advice("recommended", &report.recommendations);
    print_advice("fallbacks", &report.fallbacks);
    true
}

fn print_advice(title: &str, advice: &Advice) {
    if advice.is_empty() {
        return;
    }
    println!();
    println!("{title}:");
    for (feature, items) in advice {
        for item in items {
            println!("  {}: {item}", feature.key());
        }
    }
}

fn keep_alive(config: &Config, bundle: &AdapterBundle, count: u64) -> bool {
    let interval = config.keep_alive_interval();
    let mut round = 0u64;
    loop {
        round += 1;
        if !report("keep-alive", bundle.keyboard.keep_alive()) {
            return false;
        }
        if count != 0 && round >= count {
            return true;
        }
        std::thread::sleep(interval);
    }
}

fn tray(bundle: &AdapterBundle) -> bool {
    if !bundle.system_tray.is_supported() {
        log::error!("tray: not supported on {}", bundle.descriptor.cache_key());
        return false;
    }

    let (quit_tx, quit_rx) = mpsc::channel::<()>();
    let label = format!("PasteBridge {}", env!("CARGO_PKG_VERSION"));
    let items = vec![
        MenuItem::new(label, || {}).disabled(),
        MenuItem::new("Quit", move || {
            let _ = quit_tx.send(());
        }),
    ];
    if !bundle.system_tray.create_tray_icon(items) {
        return report("tray", false);
    }

    log::info!("tray: running, choose Quit to exit");
    let _ = quit_rx.recv();
    bundle.system_tray.stop();
    true
}
