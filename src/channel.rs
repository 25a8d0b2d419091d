//! Message channels.
//!
//! The engine decides what text to emit and on which [`Channel`]; sinks
//! decide where it physically goes. `comments` carries the build-log report
//! and `debug` carries terminal-only output.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Comments,
    Debug,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Comments => "comments",
            Channel::Debug => "debug",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Pass,
    Fail,
    Warning,
}

pub trait MessageSink {
    fn emit(&mut self, channel: Channel, severity: Severity, text: &str);
}

/// A sink shared between the session and whoever reads it afterwards.
#[derive(Clone)]
pub struct SharedSink(pub Rc<RefCell<dyn MessageSink>>);

impl SharedSink {
    pub fn new<T: MessageSink + 'static>(sink: T) -> Self {
        SharedSink(Rc::new(RefCell::new(sink)))
    }

    /// Wraps an existing shared sink so the caller keeps typed access to it.
    pub fn from_rc<T: MessageSink + 'static>(sink: Rc<RefCell<T>>) -> Self {
        SharedSink(sink)
    }

    pub fn emit(&self, channel: Channel, severity: Severity, text: &str) {
        self.0.borrow_mut().emit(channel, severity, text);
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSink")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: Channel,
    pub severity: Severity,
    pub text: String,
}

/// BufferSink: collects messages for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub messages: Vec<Message>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<BufferSink>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn lines(&self, channel: Channel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.text.as_str())
            .collect()
    }

    pub fn text(&self, channel: Channel) -> String {
        self.lines(channel).join("\n")
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.text.as_str())
            .collect()
    }
}

impl MessageSink for BufferSink {
    fn emit(&mut self, channel: Channel, severity: Severity, text: &str) {
        self.messages.push(Message {
            channel,
            severity,
            text: text.to_string(),
        });
    }
}

/// LogSink: forwards messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn emit(&mut self, channel: Channel, severity: Severity, text: &str) {
        match (channel, severity) {
            (_, Severity::Warning) => log::warn!(target: "verity", "{}", text),
            (_, Severity::Fail) => log::error!(target: "verity", "{}", text),
            (Channel::Comments, _) => log::info!(target: "verity", "{}", text),
            (Channel::Debug, _) => log::debug!(target: "verity", "{}", text),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn emit(&mut self, _channel: Channel, _severity: Severity, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_splits_channels() {
        let buffer = BufferSink::shared();
        let shared = SharedSink::from_rc(buffer.clone());
        shared.emit(Channel::Comments, Severity::Info, "# Module: a");
        shared.emit(Channel::Debug, Severity::Pass, "ok");
        shared.emit(Channel::Comments, Severity::Warning, "careful");

        let buffer = buffer.borrow();
        assert_eq!(buffer.lines(Channel::Comments), vec!["# Module: a", "careful"]);
        assert_eq!(buffer.text(Channel::Debug), "ok");
        assert_eq!(buffer.with_severity(Severity::Warning), vec!["careful"]);
    }
}
