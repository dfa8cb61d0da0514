//! Main chat event loop.
//!
//! Terminal events arrive from a reader task; completions run on spawned
//! tasks and report back through a channel, so drawing never waits on the
//! network.

mod keybindings;
pub mod lifecycle;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

use self::keybindings::{map_key, KeyAction};
use self::lifecycle::{apply_cursor_color, restore_terminal, setup_terminal};
use crate::core::chat::ChatSession;
use crate::core::completion::{CompletionBackend, CompletionError};
use crate::core::workspace::PendingSend;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;

const TICK: Duration = Duration::from_millis(250);
const PAGE: u16 = 10;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Result of one completion call, handed back to the loop.
pub struct CompletionDone {
    pub pending: PendingSend,
    pub result: Result<String, CompletionError>,
}

pub async fn run_chat(
    session: ChatSession,
    backend: Arc<dyn CompletionBackend>,
    theme: Theme,
) -> Result<(), Box<dyn Error>> {
    let mut view = ChatView::new(session, theme);
    let mut terminal = setup_terminal(view.persona_color())?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<CompletionDone>();

    let event_reader_handle = tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    });

    let mut ticker = tokio::time::interval(TICK);
    let result: Result<(), Box<dyn Error>> = async {
        loop {
            terminal.draw(|f| ui(f, &mut view))?;

            tokio::select! {
                Some(UiEvent::Crossterm(ev)) = event_rx.recv() => {
                    let previous_color = view.persona_color();
                    handle_event(&mut view, ev, &backend, &done_tx);
                    let color = view.persona_color();
                    if color != previous_color {
                        apply_cursor_color(&mut terminal, color)?;
                    }
                }
                Some(done) = done_rx.recv() => {
                    finish_completion(&mut view, done);
                }
                _ = ticker.tick() => {}
            }

            if view.exit_requested {
                break;
            }
        }
        Ok(())
    }
    .await;

    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    result
}

fn handle_event(
    view: &mut ChatView,
    ev: Event,
    backend: &Arc<dyn CompletionBackend>,
    done_tx: &mpsc::UnboundedSender<CompletionDone>,
) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key(view, key, backend, done_tx)
        }
        Event::Paste(text) => {
            if view.session.input_enabled() && view.picker.is_none() {
                let sanitized = text
                    .replace('\t', "    ")
                    .replace('\r', "\n")
                    .chars()
                    .filter(|&c| c == '\n' || !c.is_control())
                    .collect::<String>();
                view.input.insert_str(&sanitized);
            }
        }
        _ => {}
    }
}

fn handle_key(
    view: &mut ChatView,
    key: KeyEvent,
    backend: &Arc<dyn CompletionBackend>,
    done_tx: &mpsc::UnboundedSender<CompletionDone>,
) {
    match map_key(&key, view.picker.is_some()) {
        KeyAction::Quit => view.exit_requested = true,
        KeyAction::Submit => submit(view, backend, done_tx),
        KeyAction::InsertNewline => {
            if view.session.input_enabled() {
                view.input.insert_newline();
            }
        }
        KeyAction::Edit => {
            if view.session.input_enabled() {
                view.input.input(tui_textarea::Input::from(key));
            }
        }
        KeyAction::OpenPersonaPicker => view.open_persona_picker(),
        KeyAction::NewThread => {
            if !view.session.input_enabled() {
                return;
            }
            if let Err(err) = view.session.new_thread() {
                warn!(error = %err, "Failed to create thread");
            }
            view.scroll_to_bottom();
        }
        KeyAction::PickerUp => {
            if let Some(picker) = view.picker.as_mut() {
                picker.move_up();
            }
        }
        KeyAction::PickerDown => {
            if let Some(picker) = view.picker.as_mut() {
                picker.move_down();
            }
        }
        KeyAction::PickerConfirm => {
            let chosen = view
                .picker
                .take()
                .and_then(|p| p.selected_item().map(|i| i.id.clone()));
            if let Some(persona_id) = chosen {
                if let Err(err) = view.session.select_persona(persona_id.as_deref()) {
                    warn!(error = %err, "Failed to select persona");
                }
                view.style_input();
            }
        }
        KeyAction::PickerCancel => view.picker = None,
        KeyAction::ScrollUp => view.scroll_up(1),
        KeyAction::ScrollDown => view.scroll_down(1),
        KeyAction::PageUp => view.scroll_up(PAGE),
        KeyAction::PageDown => view.scroll_down(PAGE),
        KeyAction::ScrollToBottom => view.scroll_to_bottom(),
        KeyAction::Ignore => {}
    }
}

/// Start a submission and hand the network call to a spawned task.
fn submit(
    view: &mut ChatView,
    backend: &Arc<dyn CompletionBackend>,
    done_tx: &mpsc::UnboundedSender<CompletionDone>,
) {
    let text = view.input_text();
    let Some(pending) = view.session.begin_submit(&text) else {
        return;
    };
    info!(model = %pending.request.model, "Submitting message");
    view.in_flight_input = Some(text);
    view.reset_input(None);
    view.scroll_to_bottom();

    let backend = Arc::clone(backend);
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = backend
            .complete(&pending.api_key, pending.request.clone())
            .await;
        let _ = done_tx.send(CompletionDone { pending, result });
    });
}

fn finish_completion(view: &mut ChatView, done: CompletionDone) {
    let failed = done.result.is_err();
    if let Err(err) = view.session.finish_submit(done.pending, done.result) {
        warn!(error = %err, "Could not store reply");
        view.session.notify(err.to_string());
    }
    view.session.settle();

    let restore = view.in_flight_input.take().filter(|_| failed);
    if restore.is_some() && view.input_text().is_empty() {
        view.reset_input(restore.as_deref());
    } else {
        view.style_input();
    }
    view.scroll_to_bottom();
}
