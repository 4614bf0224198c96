//! Terminal 2048 runner (default binary).
//!
//! One synchronous loop owns the game: it reads keys, drains adapter
//! commands, applies both through the same session, and redraws. Uses
//! crossterm for input and the framebuffer renderer from `tui_2048::term`.

use std::fs::OpenOptions;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use env_logger::Env;

use tui_2048::adapter::{
    build_observation, create_ack, Adapter, ClientCommand, InboundPayload, OutboundMessage,
};
use tui_2048::input::{handle_key_event, is_hint_request, is_press, should_quit};
use tui_2048::term::{AdapterStatusView, FrameBuffer, GameView, Hud, TerminalRenderer, Viewport};
use tui_2048::{AppConfig, Session};

/// Upper bound on how long a frame waits for a key before polling the adapter.
const FRAME_MS: u64 = 16;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config)?;

    let mut adapter = if config.adapter.disabled {
        log::info!("control adapter disabled (TUI2048_AI_DISABLED)");
        None
    } else {
        match Adapter::start(config.adapter.clone()) {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                log::warn!("running without control adapter: {:#}", e);
                None
            }
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(config: &AppConfig) -> Result<()> {
    // Stderr would draw over the alternate screen, so log only to a file.
    let Some(path) = config.log_path.as_ref() else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("tui-2048 starting (seed {})", config.seed);
    Ok(())
}

fn run(
    term: &mut TerminalRenderer,
    config: &AppConfig,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let mut session = Session::new(config);
    session.start();

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut obs_seq: u64 = 0;

    loop {
        let snapshot = session.snapshot();
        let status = adapter.as_deref().map(|a| {
            let st = a.status();
            AdapterStatusView {
                client_count: st.client_count,
                controller_id: st.controller_id,
                streaming_count: st.streaming_count,
            }
        });
        let hud = Hud {
            hint: session.hint(),
            adapter: status.as_ref(),
            celebrate: session.celebrate(),
        };
        let viewport = term.viewport().unwrap_or(Viewport::new(80, 24));
        view.render_into(&snapshot, hud, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        let mut changed = false;

        if event::poll(Duration::from_millis(FRAME_MS))? {
            match event::read()? {
                Event::Key(key) if is_press(&key) => {
                    if should_quit(key) {
                        session.finish();
                        return Ok(());
                    }
                    if is_hint_request(key) {
                        match session.request_hint() {
                            Some(hint) => log::debug!("hint: {} ({})", hint.direction, hint.reason),
                            None => log::debug!("hint ignored: game is not in play"),
                        }
                    } else if let Some(action) = handle_key_event(key) {
                        changed |= session.apply(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::SnapshotRequest => {
                        obs_seq += 1;
                        let snap = session.snapshot();
                        let obs = build_observation(&snap, session.game().last_event(), obs_seq);
                        adapter.send(OutboundMessage::ToClientObservation {
                            client_id: cmd.client_id,
                            obs,
                        });
                    }
                    InboundPayload::Command(ClientCommand::Moves(moves)) => {
                        for action in moves {
                            changed |= session.apply(action);
                        }
                        adapter.send(OutboundMessage::ToClientAck {
                            client_id: cmd.client_id,
                            ack: create_ack(cmd.seq),
                        });
                    }
                }
            }

            if changed {
                obs_seq += 1;
                let snap = session.snapshot();
                let obs = build_observation(&snap, session.game().last_event(), obs_seq);
                adapter.send(OutboundMessage::BroadcastObservation { obs });
            }
        }
    }
}
