// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Skilltree CLI entrypoint.
//!
//! By default this serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` until
//! Ctrl-C. Use `--mcp` to serve over stdio instead (intended for tool integrations).

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skilltree::editor::{Editor, EditorConfig, Effect};
use skilltree::mcp::SkillTreeMcp;
use skilltree::store::{demo_snapshot, TreeFile, WriteDurability};

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
const DEFAULT_TREE_FILE: &str = "skill-tree.json";
const DEFAULT_LOG_FILTER: &str = "skilltree=info";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<tree.json>] [--durable-writes] [--double-tap-ms <ms>] [--mcp-http-port <port>]\n  {program} [--tree <file>] [--durable-writes] [--double-tap-ms <ms>] [--mcp-http-port <port>]\n  {program} --demo [--double-tap-ms <ms>] [--mcp-http-port <port>]\n  {program} [<tree.json>] [--durable-writes] --mcp\n  {program} --demo --mcp\n\nBy default MCP is served over streamable HTTP at `http://127.0.0.1:<port>/mcp`.\n--mcp-http-port selects the port (0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}).\n--mcp serves MCP over stdio instead.\n\nIf the tree file is omitted, `{DEFAULT_TREE_FILE}` in the current directory is used.\n--demo uses a built-in demo tree held in memory and cannot be combined with a tree file.\n\n--double-tap-ms sets the double-tap window (default 300).\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLogging goes to stderr; set RUST_LOG to adjust (default `{DEFAULT_LOG_FILTER}`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    mcp: bool,
    demo: bool,
    tree_file: Option<String>,
    mcp_http_port: Option<u16>,
    durable_writes: bool,
    double_tap_ms: Option<u64>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mcp" => {
                if options.mcp {
                    return Err(());
                }
                options.mcp = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--tree" => {
                if options.tree_file.is_some() {
                    return Err(());
                }
                options.tree_file = Some(args.next().ok_or(())?);
            }
            "--mcp-http-port" => {
                if options.mcp_http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.mcp_http_port = Some(raw.parse().map_err(|_| ())?);
            }
            "--double-tap-ms" => {
                if options.double_tap_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let ms: u64 = raw.parse().map_err(|_| ())?;
                if ms == 0 {
                    return Err(());
                }
                options.double_tap_ms = Some(ms);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.tree_file.is_some() {
                    return Err(());
                }
                options.tree_file = Some(arg);
            }
        }
    }

    if options.demo && options.tree_file.is_some() {
        return Err(());
    }

    if options.mcp && options.mcp_http_port.is_some() {
        return Err(());
    }

    Ok(options)
}

fn editor_config(options: &CliOptions) -> EditorConfig {
    match options.double_tap_ms {
        Some(ms) => EditorConfig { double_tap_window: Duration::from_millis(ms) },
        None => EditorConfig::default(),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // stdout carries MCP stdio traffic.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn build_server(options: &CliOptions) -> Result<SkillTreeMcp, Box<dyn Error>> {
    let mut editor = Editor::new(editor_config(options));

    if options.demo {
        editor.load_snapshot(demo_snapshot());
        return Ok(SkillTreeMcp::new(editor));
    }

    let path = options.tree_file.clone().unwrap_or_else(|| DEFAULT_TREE_FILE.to_owned());
    let tree_file = if options.durable_writes {
        TreeFile::new(path).with_durability(WriteDurability::Durable)
    } else {
        TreeFile::new(path)
    };
    let snapshot = tree_file.load_or_default(editor.icons())?;
    let outcome = editor.load_snapshot(snapshot);
    for effect in &outcome.effects {
        if let Effect::Notice { message } = effect {
            warn!(%message, "saved tree is not playable; opened in builder mode");
        }
    }
    Ok(SkillTreeMcp::new_persistent(editor, tree_file))
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "skilltree".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging();
        let mcp = build_server(&options)?;
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.mcp {
            info!("serving MCP over stdio");
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let mcp_http_port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", mcp_http_port)).await?;
            let local_addr = listener.local_addr()?;

            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..StreamableHttpServerConfig::default()
            };
            let shutdown_token = config.cancellation_token.clone();
            let server_shutdown = shutdown_token.clone();

            let session_manager = Arc::new(LocalSessionManager::default());
            let mcp_service =
                StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

            let router = Router::new().nest_service("/mcp", mcp_service);
            info!(%local_addr, "serving MCP over streamable HTTP at /mcp");
            let server_handle = tokio::spawn(async move {
                let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                    server_shutdown.cancelled().await;
                });
                if let Err(err) = serve.await {
                    tracing::error!(error = %err, "MCP HTTP server error");
                }
            });

            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            shutdown_token.cancel();
            let _ = server_handle.await;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("skilltree: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{editor_config, parse_options, CliOptions};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_empty_args() {
        assert_eq!(parse(&[]).expect("parse options"), CliOptions::default());
    }

    #[test]
    fn parses_demo_and_mcp_in_any_order() {
        for args in [["--demo", "--mcp"], ["--mcp", "--demo"]] {
            let options = parse(&args).expect("parse options");
            assert!(options.demo);
            assert!(options.mcp);
        }
    }

    #[test]
    fn parses_tree_file_by_flag_or_position() {
        let options = parse(&["--tree", "trees/ranger.json"]).expect("parse options");
        assert_eq!(options.tree_file.as_deref(), Some("trees/ranger.json"));

        let options = parse(&["ranger.json", "--mcp"]).expect("parse options");
        assert_eq!(options.tree_file.as_deref(), Some("ranger.json"));
        assert!(options.mcp);
    }

    #[test]
    fn parses_port_durability_and_double_tap_window() {
        let options =
            parse(&["--mcp-http-port", "1234", "--durable-writes", "--double-tap-ms", "450"])
                .expect("parse options");
        assert_eq!(options.mcp_http_port, Some(1234));
        assert!(options.durable_writes);
        assert_eq!(editor_config(&options).double_tap_window, Duration::from_millis(450));
        assert_eq!(editor_config(&CliOptions::default()).double_tap_window, Duration::from_millis(300));
    }

    #[rstest]
    #[case::unknown_flag(&["--nope"])]
    #[case::duplicate_demo(&["--demo", "--demo"])]
    #[case::duplicate_tree(&["--tree", "a.json", "--tree", "b.json"])]
    #[case::two_positionals(&["a.json", "b.json"])]
    #[case::flag_and_positional(&["--tree", "a.json", "b.json"])]
    #[case::missing_tree_value(&["--tree"])]
    #[case::demo_with_tree(&["--demo", "a.json"])]
    #[case::port_with_stdio(&["--mcp", "--mcp-http-port", "0"])]
    #[case::bad_port(&["--mcp-http-port", "70000"])]
    #[case::zero_double_tap(&["--double-tap-ms", "0"])]
    fn rejects_invalid_args(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }
}
