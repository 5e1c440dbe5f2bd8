use std::{
    io::Write,
    sync::{Mutex, MutexGuard, PoisonError},
};

use dietchat_core::domain::{
    common::entities::app_errors::CoreError, interaction::UserPrompt, share::Clipboard,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};

const YES: [&str; 5] = ["y", "yes", "是", "确定", "好"];

/// Line-oriented console shared by the command loop and interactive
/// questions. Everything shown to the user goes through `out`.
pub struct Terminal<R, W> {
    lines: tokio::sync::Mutex<Lines<BufReader<R>>>,
    out: Mutex<W>,
}

impl Terminal<Stdin, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), std::io::stdout())
    }
}

impl<R: AsyncRead + Unpin + Send, W: Write + Send> Terminal<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(reader).lines()),
            out: Mutex::new(out),
        }
    }

    /// Next input line, or `None` at end of input.
    pub async fn read_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }

    /// The output writer. Never hold the guard across an await.
    pub fn out(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn show_question(&self, message: &str, suffix: &str) {
        let mut out = self.out();
        // The question is only a hint; a closed output must not abort the read.
        let _ = write!(out, "{message}{suffix}");
        let _ = out.flush();
    }
}

impl<R: AsyncRead + Unpin + Send, W: Write + Send> UserPrompt for Terminal<R, W> {
    async fn confirm(&self, message: &str) -> bool {
        self.show_question(message, " [y/N] ");
        match self.read_line().await {
            Ok(Some(answer)) => YES.contains(&answer.trim().to_lowercase().as_str()),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        self.show_question(message, "\n> ");
        match self.read_line().await {
            Ok(answer) => answer.map(|a| a.trim().to_string()),
            Err(e) => {
                tracing::warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

/// Stand-in for a system clipboard: prints the text so it can be copied
/// from the console.
#[derive(Debug, Default)]
pub struct ConsoleClipboard;

impl Clipboard for ConsoleClipboard {
    fn copy(&self, text: &str) -> Result<(), CoreError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "----- 复制以下内容分享 -----\n{text}\n---------------------------")
            .map_err(|e| CoreError::ExportFailed(e.to_string()))
    }
}
