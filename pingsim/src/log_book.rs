use crate::sink::EventReceiver;
use anyhow::{Context as _, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use pingsim_core::LogEvent;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Ordered, append-only record of the events a shell has received.
///
/// This is the shell side of a session: the session itself keeps nothing
/// once an event is delivered.
#[derive(Debug, Default, Clone)]
pub struct LogBook {
    events: Vec<LogEvent>,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    /// move every event currently waiting in `events` into the book
    pub fn drain_from(&mut self, events: &mut EventReceiver) -> usize {
        let before = self.events.len();
        while let Ok(event) = events.try_recv() {
            self.events.push(event);
        }
        self.events.len() - before
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter()
    }

    /// Write the book as text, one `[<local date time>] <message>` line
    /// per event.
    ///
    /// Returns `false` without writing anything if the book is empty.
    pub fn export<W: Write>(&self, writer: &mut W) -> Result<bool> {
        self.export_in(&Local, writer)
    }

    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if self.is_empty() {
            return Ok(false);
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create log export {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.export(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write log export {}", path.display()))?;

        Ok(true)
    }

    fn export_in<Tz, W>(&self, tz: &Tz, writer: &mut W) -> Result<bool>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
        W: Write,
    {
        if self.is_empty() {
            return Ok(false);
        }

        let lines = self
            .events
            .iter()
            .map(|event| {
                let time = event.timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M:%S");
                format!("[{time}] {message}", message = event.message)
            })
            .collect::<Vec<_>>()
            .join("\n");

        writer
            .write_all(lines.as_bytes())
            .context("Failed to write exported log")?;
        Ok(true)
    }
}

impl<'a> IntoIterator for &'a LogBook {
    type Item = &'a LogEvent;
    type IntoIter = std::slice::Iter<'a, LogEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// `ping-log-<epoch millis>.txt`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("ping-log-{}.txt", now.timestamp_millis())
}

/// `[HH:MM:SS.mmm] <message>` in local time, for live display.
pub fn display_line(event: &LogEvent) -> String {
    display_line_in(&Local, event)
}

fn display_line_in<Tz>(tz: &Tz, event: &LogEvent) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let time = event.timestamp.with_timezone(tz).format("%H:%M:%S%.3f");
    format!("[{time}] {message}", message = event.message)
}
