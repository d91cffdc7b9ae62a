// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! User-facing status output.
//!
//! Diagnostics go through `tracing`; the `Console` only carries the lines a
//! person running a deployment is meant to read.

use std::io::{self, Write};
use std::time::Duration;
use tracing::warn;

pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, text: &str) {
        self.write(format_args!("{}\n", text));
    }

    pub fn success(&mut self, text: &str) {
        self.write(format_args!("✔ {}\n", text));
    }

    /// A titled block, one indented line per entry
    pub fn panel(&mut self, title: &str, lines: &[String]) {
        self.write(format_args!("{}\n", title));
        for line in lines {
            self.write(format_args!("    {}\n", line));
        }
    }

    pub fn summary(&mut self, elapsed: Duration) {
        self.write(format_args!("Summary: {}\n", format_elapsed(elapsed)));
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.flush()) {
            warn!("Failed to write console output: {}", e);
        }
    }
}

/// `H:MM:SS` with a `.ffffff` fraction when there are sub-second parts
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let micros = elapsed.subsec_micros();
    let base = format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);

    if micros == 0 {
        base
    } else {
        format!("{}.{:06}", base, micros)
    }
}
