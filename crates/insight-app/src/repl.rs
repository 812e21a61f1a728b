//! Line commands and transcript printing for the terminal host.

use insight_chat::view::{MessageView, SessionView};
use insight_core::types::{FeedbackStatus, Speaker};

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /paste <text>   paste plain text into the draft (\\n starts a new line)
  /send           send the current draft
  /copy N         copy bot message N to the clipboard
  /like N         like bot message N
  /dislike N      dislike bot message N
  /show           reprint the conversation
  /quit           exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Replace the draft with this text and send it.
    Ask(String),
    Paste(String),
    Send,
    Copy(usize),
    Like(usize),
    Dislike(usize),
    Show,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl HostCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return HostCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return HostCommand::Ask(line.to_string());
        };

        let (name, arg) = match rest.split_once(' ') {
            Some((name, arg)) => (name, arg),
            None => (rest, ""),
        };
        match name {
            "paste" => HostCommand::Paste(unescape_newlines(arg)),
            "send" => HostCommand::Send,
            "copy" => parse_index(arg, HostCommand::Copy),
            "like" => parse_index(arg, HostCommand::Like),
            "dislike" => parse_index(arg, HostCommand::Dislike),
            "show" => HostCommand::Show,
            "help" => HostCommand::Help,
            "quit" | "exit" => HostCommand::Quit,
            other => HostCommand::Invalid(format!("unknown command /{}", other)),
        }
    }
}

fn parse_index(arg: &str, build: fn(usize) -> HostCommand) -> HostCommand {
    match arg.trim().parse::<usize>() {
        Ok(index) => build(index),
        Err(_) => HostCommand::Invalid(format!("expected a message number, got {:?}", arg.trim())),
    }
}

/// `\n` in a typed line becomes a real line break.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Render one transcript entry.
pub fn format_message(message: &MessageView) -> String {
    let who = match message.speaker {
        Speaker::User => "you",
        Speaker::Bot => "bot",
    };
    let mut marks = String::new();
    match message.status {
        FeedbackStatus::Up => marks.push_str(" [liked]"),
        FeedbackStatus::Down => marks.push_str(" [disliked]"),
        FeedbackStatus::None => {}
    }
    if message.copied {
        marks.push_str(" [copied]");
    }
    let text = message.text.replace('\n', "\n      ");
    format!("#{:<3} {}> {}{}", message.index, who, text, marks)
}

/// Render the status line shown under the transcript.
pub fn format_status(view: &SessionView) -> String {
    let mut status = format!("[{}] {}", view.title, view.status_label);
    if let Some(ref hint) = view.credential_hint {
        status.push_str(" | ");
        status.push_str(hint);
    }
    if !view.draft.is_blank() {
        status.push_str(&format!(" | draft: {:?}", view.draft.text));
    }
    status
}
