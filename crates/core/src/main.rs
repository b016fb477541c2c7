//! Console adapter for sana: a readline chat loop, a `/time HH:MM` command,
//! and an optional watched time file, all driving the dispatcher. Replies
//! are rendered as numbered points for the terminal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sana_core::clock::{self, ClockSource, ClockTime};
use sana_core::config::CoachCfg;
use sana_core::dispatch::{Dispatcher, MessageChannel};
use sana_core::engine::ConversationEngine;
use sana_core::session::store::SessionStore;
use sana_core::telemetry::fixture::TelemetryFixture;
use sana_llm::provider::{LlmProvider, MockProvider};

/// Prints each assistant message as a numbered list.
struct ConsoleChannel;

#[async_trait]
impl MessageChannel for ConsoleChannel {
    async fn deliver(&self, _session_id: &str, text: &str) {
        println!("\nAssistant:\n{}\n", numbered(text));
    }
}

/// Strip markdown emphasis and any existing numbering, drop empty lines,
/// renumber what remains.
fn numbered(text: &str) -> String {
    text.replace('*', "")
        .lines()
        .map(|line| strip_numbering(line.trim()))
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_numbering(line: &str) -> &str {
    if let Some((prefix, rest)) = line.split_once(". ")
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
    {
        return rest.trim_start();
    }
    line
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = CoachCfg::from_env().context("invalid configuration")?;

    let clock = Arc::new(match &cfg.clock_state_path {
        Some(path) => ClockSource::with_persistence(path.clone()),
        None => ClockSource::new(),
    });

    let llm: Arc<dyn LlmProvider> = match sana_llm::http::from_env() {
        Some(provider) => Arc::new(provider),
        None => {
            println!(
                "note: SANA_LLM_MODEL / SANA_LLM_API_KEY not set — replies are canned.\n"
            );
            Arc::new(MockProvider::new(
                "I'm running without a language model right now. \
                 Set SANA_LLM_MODEL and SANA_LLM_API_KEY for real coaching.",
            ))
        }
    };

    let engine = Arc::new(ConversationEngine::new(
        Arc::clone(&clock),
        TelemetryFixture::simulated(),
        llm,
        &cfg,
    ));
    let dispatcher = Dispatcher::new(
        Arc::clone(&clock),
        engine,
        Arc::new(SessionStore::new()),
        cfg.schedule,
        Arc::new(ConsoleChannel),
    );

    let token = CancellationToken::new();
    spawn_sigint_canceler(token.clone());

    let mut time_rx = cfg.time_file.as_ref().map(|path| {
        clock::watch_time_file(
            path.clone(),
            Duration::from_millis(cfg.time_file_poll_ms),
            token.clone(),
        )
    });

    let session_id = uuid::Uuid::new_v4().to_string();
    println!(
        "Welcome to Samantha's Health Assistant! ('/quit' to exit, '/time HH:MM' to set the clock)\n"
    );
    dispatcher.on_user_message(&session_id, "Hi").await;

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<InputEvent>();
    spawn_input_thread(line_tx);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = recv_time(&mut time_rx) => {
                match changed {
                    Some(t) => dispatcher.on_clock_changed(t).await,
                    None => time_rx = None,
                }
            }
            event = line_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    InputEvent::Line(line) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        if matches!(text, "/q" | "/quit" | "/exit") {
                            break;
                        }
                        if let Some(raw) = text.strip_prefix("/time") {
                            match ClockTime::parse(raw.trim()) {
                                Ok(t) => dispatcher.on_clock_changed(t).await,
                                Err(e) => eprintln!("{e}"),
                            }
                            continue;
                        }
                        dispatcher.on_user_message(&session_id, text).await;
                    }
                    InputEvent::Interrupted | InputEvent::Eof => break,
                    InputEvent::Error(err) => {
                        eprintln!("input error: {err}");
                        break;
                    }
                }
            }
        }
    }

    token.cancel();
    println!("Goodbye, Samantha! Stay healthy.");
    Ok(())
}

/// Await the next watched time change, or never if no file is watched.
async fn recv_time(rx: &mut Option<mpsc::Receiver<ClockTime>>) -> Option<ClockTime> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

enum InputEvent {
    Line(String),
    Interrupted,
    Eof,
    Error(String),
}

fn spawn_input_thread(line_tx: mpsc::UnboundedSender<InputEvent>) {
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                let _ = line_tx.send(InputEvent::Error(e.to_string()));
                return;
            }
        };

        loop {
            match editor.readline("You: ") {
                Ok(line) => {
                    if line_tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let _ = line_tx.send(InputEvent::Interrupted);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    let _ = line_tx.send(InputEvent::Eof);
                    break;
                }
                Err(e) => {
                    let _ = line_tx.send(InputEvent::Error(e.to_string()));
                    break;
                }
            }
        }
    });
}

fn spawn_sigint_canceler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_strips_emphasis_and_renumbers() {
        let raw = "*Great job today!*\n\n1. Keep walking\nDrink water\n2. Sleep early";
        assert_eq!(
            numbered(raw),
            "1. Great job today!\n2. Keep walking\n3. Drink water\n4. Sleep early"
        );
    }

    #[test]
    fn numbered_keeps_plain_text() {
        assert_eq!(numbered("hello"), "1. hello");
    }

    #[test]
    fn strip_numbering_only_touches_leading_digits() {
        assert_eq!(strip_numbering("3. water"), "water");
        assert_eq!(strip_numbering("a. water"), "a. water");
        assert_eq!(strip_numbering("water"), "water");
    }
}
