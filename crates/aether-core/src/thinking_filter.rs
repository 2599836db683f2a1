// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Splits a model's text-delta stream into visible content and reasoning
//! content wrapped in well-known tag pairs (`<think>`, `<thinking>`,
//! `<reasoning>`, `<thought>`, `<reflection>`; case-insensitive).
//!
//! Some providers stream reasoning out-of-band (`ResponseEvent::ThinkingDelta`);
//! this filter exists for the ones that don't and instead inline it in the
//! text stream. It is an incremental state machine so it can run directly
//! on a live token stream without waiting for the full response — see
//! [`ThinkingFilter`]. [`strip_thinking_tags`] is the non-streaming
//! equivalent used by the single-shot response path.

const OPEN_TAGS: &[&str] = &["<think>", "<thinking>", "<reasoning>", "<thought>", "<reflection>"];
const CLOSE_TAGS: &[&str] =
    &["</think>", "</thinking>", "</reasoning>", "</thought>", "</reflection>"];

fn longest_tag_len() -> usize {
    OPEN_TAGS.iter().chain(CLOSE_TAGS).map(|t| t.len()).max().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Visible,
    InsideThinking,
}

/// A chunk of filtered output: either visible text or extracted reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredDelta {
    Token(String),
    Thinking(String),
}

/// Incremental thinking-tag filter. Feed it arbitrary-sized text chunks via
/// [`push`](Self::push); call [`flush`](Self::flush) once the stream ends to
/// drain anything left in the look-ahead buffer.
#[derive(Debug, Default)]
pub struct ThinkingFilter {
    state_inside: bool,
    buf: String,
}

impl ThinkingFilter {
    pub fn new() -> Self {
        Self { state_inside: false, buf: String::new() }
    }

    fn state(&self) -> State {
        if self.state_inside { State::InsideThinking } else { State::Visible }
    }

    /// Feed the next chunk of the raw text-delta stream. Returns zero or
    /// more filtered deltas ready to emit; anything that might still be the
    /// prefix of a tag is held back in the internal buffer.
    pub fn push(&mut self, chunk: &str) -> Vec<FilteredDelta> {
        self.buf.push_str(chunk);
        let mut out = Vec::new();
        loop {
            if self.buf.is_empty() {
                break;
            }
            match self.state() {
                State::Visible => {
                    let Some(lt) = self.buf.find('<') else {
                        out.push(FilteredDelta::Token(std::mem::take(&mut self.buf)));
                        break;
                    };
                    if lt > 0 {
                        out.push(FilteredDelta::Token(self.buf[..lt].to_string()));
                        self.buf.drain(..lt);
                    }
                    match match_candidate(&self.buf, OPEN_TAGS) {
                        TagMatch::Complete(len) => {
                            self.buf.drain(..len);
                            self.state_inside = true;
                        }
                        TagMatch::Partial => break,
                        TagMatch::None => {
                            out.push(FilteredDelta::Token("<".to_string()));
                            self.buf.drain(..1);
                        }
                    }
                }
                State::InsideThinking => {
                    let Some(lt) = self.buf.find('<') else {
                        out.push(FilteredDelta::Thinking(std::mem::take(&mut self.buf)));
                        break;
                    };
                    if lt > 0 {
                        out.push(FilteredDelta::Thinking(self.buf[..lt].to_string()));
                        self.buf.drain(..lt);
                    }
                    match match_candidate(&self.buf, CLOSE_TAGS) {
                        TagMatch::Complete(len) => {
                            self.buf.drain(..len);
                            self.state_inside = false;
                        }
                        TagMatch::Partial => break,
                        TagMatch::None => {
                            out.push(FilteredDelta::Thinking("<".to_string()));
                            self.buf.drain(..1);
                        }
                    }
                }
            }
        }
        out
    }

    /// Drain whatever remains buffered at stream end. An unclosed
    /// `InsideThinking` tail is emitted as thinking, never as visible text.
    pub fn flush(mut self) -> Option<FilteredDelta> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(match self.state() {
            State::Visible => FilteredDelta::Token(rest),
            State::InsideThinking => FilteredDelta::Thinking(rest),
        })
    }
}

enum TagMatch {
    Complete(usize),
    Partial,
    None,
}

/// `buf` always starts with `<`. Checks whether it completes, could still
/// complete with more input, or can't possibly match any candidate tag.
fn match_candidate(buf: &str, tags: &[&str]) -> TagMatch {
    let lower: String = buf.chars().take(longest_tag_len()).collect::<String>().to_lowercase();
    for tag in tags {
        if lower.starts_with(tag) {
            return TagMatch::Complete(tag.len());
        }
    }
    let could_still_match = tags.iter().any(|tag| tag.starts_with(&lower) || lower.starts_with(tag));
    if could_still_match && buf.len() < longest_tag_len() {
        TagMatch::Partial
    } else {
        TagMatch::None
    }
}

/// Non-streaming batch pass: strips every closed thinking-tag pair with a
/// greedy non-overlapping scan, then strips a trailing unclosed opening tag
/// (guards against truncated reasoning cutting off mid-block).
pub fn strip_thinking_tags(text: &str) -> String {
    let mut visible = String::new();
    let mut rest = text;
    'outer: loop {
        let Some(lt) = rest.find('<') else {
            visible.push_str(rest);
            break;
        };
        visible.push_str(&rest[..lt]);
        let tail = &rest[lt..];
        let lower_tail = tail.to_lowercase();
        for (open, close) in OPEN_TAGS.iter().zip(CLOSE_TAGS.iter()) {
            if lower_tail.starts_with(open) {
                if let Some(close_pos) = lower_tail.find(close) {
                    rest = &tail[close_pos + close.len()..];
                    continue 'outer;
                }
                // Unclosed opening tag: drop the rest of the content.
                break 'outer;
            }
        }
        visible.push('<');
        rest = &tail[1..];
    }
    visible
}
