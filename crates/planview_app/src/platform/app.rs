use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use chrono::Local;
use planview_core::{update, Msg, ViewerController};
use planview_logging::{pv_debug, pv_error, pv_info, pv_warn};
use planview_remote::{RemoteHandle, ReqwestPlanService};

use super::clipboard::TerminalClipboard;
use super::config::ViewerConfig;
use super::effects::{EffectRunner, MsgSink};
use super::input::{self, Command};
use super::snapshot::SnapshotWriter;
use super::ui;

/// Everything the loop consumes: viewer messages from stdin, remote
/// completions and timers, plus the request to stop.
#[derive(Debug)]
pub enum Inbound {
    Msg(Msg),
    Shutdown,
}

pub fn run_app(config: ViewerConfig) -> anyhow::Result<()> {
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>();

    let service = ReqwestPlanService::new(config.remote_settings())
        .with_context(|| format!("invalid server configuration for {}", config.server_url))?;
    let remote = RemoteHandle::spawn(Arc::new(service), MsgSink::new(inbound_tx.clone()))
        .context("failed to start the remote worker")?;

    let native_clipboard = config.native_clipboard && io::stdout().is_terminal();
    let clipboard = TerminalClipboard::new(
        io::stdout(),
        native_clipboard,
        config.clipboard_fallback.clone(),
    );
    let mut runner = EffectRunner::new(remote, Box::new(clipboard), inbound_tx.clone());
    let writer = SnapshotWriter::new(config.snapshot_path.clone());

    pv_info!(
        "Viewer started: server={} snapshot={:?} native_clipboard={}",
        config.server_url,
        writer.target(),
        native_clipboard
    );
    spawn_stdin_reader(inbound_tx.clone())?;

    let mut state = ViewerController::new(config.viewer_settings());
    let _ = inbound_tx.send(Inbound::Msg(Msg::ContainerResized {
        width: config.container_width,
        height: config.container_height,
    }));
    render_snapshot(&writer, &state);
    drop(inbound_tx);

    for inbound in inbound_rx {
        let msg = match inbound {
            Inbound::Msg(msg) => msg,
            Inbound::Shutdown => break,
        };
        pv_debug!("Dispatch {}", msg_name(&msg));
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
        if state.consume_dirty() {
            render_snapshot(&writer, &state);
        }
    }

    pv_info!("Viewer stopped");
    Ok(())
}

fn render_snapshot(writer: &SnapshotWriter, state: &ViewerController) {
    let view = state.view();
    let html = ui::render::render_page(&view, Local::now());
    match writer.write(&html) {
        Ok(path) => {
            println!("{}", ui::render::status_line(&view));
            pv_debug!("Snapshot written to {:?}", path);
        }
        Err(err) => {
            pv_error!("Failed to write snapshot: {}", err);
            eprintln!("snapshot: {err}");
        }
    }
}

/// Reads commands from stdin until EOF or `quit`.
fn spawn_stdin_reader(inbound: mpsc::Sender<Inbound>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("planview-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        pv_warn!("Stopped reading stdin: {}", err);
                        break;
                    }
                };
                let command = match input::parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        eprintln!("{err}\n{}", input::HELP);
                        continue;
                    }
                };
                let msg = match command {
                    Command::Quit => break,
                    Command::PasteFile(path) => match fs::read_to_string(&path) {
                        Ok(content) => Msg::Pasted(content),
                        Err(err) => {
                            pv_warn!("Could not read {:?}: {}", path, err);
                            eprintln!("paste: could not read {}: {err}", path.display());
                            continue;
                        }
                    },
                    other => match other.into_msg() {
                        Some(msg) => msg,
                        None => continue,
                    },
                };
                if inbound.send(Inbound::Msg(msg)).is_err() {
                    return;
                }
            }
            let _ = inbound.send(Inbound::Shutdown);
        })
        .context("failed to start the stdin reader")?;
    Ok(())
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::Pasted(_) => "Pasted",
        Msg::CopyClicked => "CopyClicked",
        Msg::ClearClicked => "ClearClicked",
        Msg::NodeClicked(_) => "NodeClicked",
        Msg::ContainerResized { .. } => "ContainerResized",
        Msg::WheelScrolled { .. } => "WheelScrolled",
        Msg::Dragged { .. } => "Dragged",
        Msg::DiagramReceived(_) => "DiagramReceived",
        Msg::DiagramFailed(_) => "DiagramFailed",
        Msg::DescendantsResolved { .. } => "DescendantsResolved",
        Msg::DescendantsFailed { .. } => "DescendantsFailed",
        Msg::CopyTextReady(_) => "CopyTextReady",
        Msg::CopyFinished(_) => "CopyFinished",
        Msg::CopyLabelExpired { .. } => "CopyLabelExpired",
    }
}
