//! Interactive confirmation gate
//!
//! The gate asks once and returns whatever line the operator typed. Matching
//! against the token happens in [`is_confirmed`] so every source of input is
//! judged the same way.

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use crate::error::PurgeResult;

/// Source of the operator's answer
#[async_trait]
pub trait Confirmation: Send {
    /// Show `prompt` and return one line of input without its line terminator.
    ///
    /// End of input yields an empty string.
    async fn ask(&mut self, prompt: &str) -> PurgeResult<String>;
}

/// Strip a trailing `\n` or `\r\n`, nothing else
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Exact, case-sensitive comparison with the confirmation token
pub fn is_confirmed(answer: &str, token: &str) -> bool {
    strip_line_ending(answer) == token
}

/// Line-oriented confirmation over any async reader/writer pair
pub struct LineConfirmation<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> LineConfirmation<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Confirmation bound to the process's stdin and stdout
pub type StdinConfirmation = LineConfirmation<BufReader<Stdin>, Stdout>;

impl StdinConfirmation {
    pub fn stdio() -> Self {
        LineConfirmation::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Confirmation for LineConfirmation<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn ask(&mut self, prompt: &str) -> PurgeResult<String> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        Ok(strip_line_ending(&line).to_string())
    }
}
