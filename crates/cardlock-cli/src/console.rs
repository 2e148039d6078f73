//! Console-driven card transceiver.
//!
//! Without a reader attached, cards are "presented" by typing their ID on
//! stdin. The text stored on each tag lives in a JSON wallet file so that
//! what `write` puts on a card is there for the next `run`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context;
use cardlock_core::{CardId, Credential};
use cardlock_hardware::{CardTransceiver, HardwareError, tag_text};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lines typed by the operator.
///
/// Stdin is read on a dedicated thread, since a blocking stdin read cannot
/// be cancelled and would otherwise hold up runtime shutdown.
#[derive(Debug)]
pub struct ConsoleInput {
    lines: mpsc::Receiver<String>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel(16);
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// Scripted input, ending after the last line.
    #[cfg(test)]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            // Capacity covers every line.
            let _ = tx.try_send(line);
        }
        Self { lines: rx }
    }

    /// Next line, or `None` once input is closed. Cancel-safe.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Print `message` without a newline and wait for the reply.
    pub async fn prompt(&mut self, message: &str) -> Option<String> {
        print!("{message}");
        let _ = io::stdout().flush();
        self.next_line().await
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WalletFile {
    tags: BTreeMap<u64, String>,
}

/// Text stored on each emulated tag, optionally persisted as JSON.
#[derive(Debug, Default)]
pub struct TagWallet {
    path: Option<PathBuf>,
    tags: BTreeMap<u64, String>,
}

impl TagWallet {
    /// Wallet that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the wallet at `path`; a missing file is an empty wallet.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let tags = match fs::read_to_string(&path) {
            Ok(text) => {
                serde_json::from_str::<WalletFile>(&text)
                    .with_context(|| format!("Malformed tag file {}", path.display()))?
                    .tags
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Cannot read tag file {}", path.display()));
            }
        };
        Ok(Self {
            path: Some(path),
            tags,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Tag contents as a reader returns them: padded to full capacity.
    pub fn read(&self, card: CardId) -> String {
        tag_text(self.tags.get(&card.as_u64()).map_or("", String::as_str))
    }

    /// Store `text` on `card`, truncated to tag capacity, and persist.
    pub fn write(&mut self, card: CardId, text: &str) -> io::Result<()> {
        let stored = tag_text(text).trim_end().to_string();
        self.tags.insert(card.as_u64(), stored);
        self.save()
    }

    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = WalletFile {
            tags: self.tags.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(io::Error::other)?;
        fs::write(path, json)?;
        debug!(path = %path.display(), "Tag file saved");
        Ok(())
    }
}

/// Card transceiver fed by [`ConsoleInput`].
///
/// Each non-blank line is one card presentation. Once input closes, the
/// first read reports the disconnection and later reads wait forever, like
/// a reader nobody walks up to.
#[derive(Debug)]
pub struct ConsoleTransceiver {
    input: ConsoleInput,
    wallet: TagWallet,
    input_closed: bool,
}

impl ConsoleTransceiver {
    pub fn new(input: ConsoleInput, wallet: TagWallet) -> Self {
        Self {
            input,
            wallet,
            input_closed: false,
        }
    }

    pub fn input_closed(&self) -> bool {
        self.input_closed
    }

    pub fn wallet(&self) -> &TagWallet {
        &self.wallet
    }

    /// Ask the operator something on the same input cards arrive on.
    pub async fn prompt(&mut self, message: &str) -> Option<String> {
        if self.input_closed {
            return None;
        }
        let reply = self.input.prompt(message).await;
        if reply.is_none() {
            self.input_closed = true;
        }
        reply
    }

    /// Next non-blank line, trimmed.
    async fn next_presentation(&mut self) -> cardlock_hardware::Result<String> {
        loop {
            if self.input_closed {
                return std::future::pending().await;
            }
            match self.input.next_line().await {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(line.trim().to_string()),
                None => {
                    self.input_closed = true;
                    warn!("Console input closed, no more cards will be presented");
                    return Err(HardwareError::disconnected("console input closed"));
                }
            }
        }
    }
}

impl CardTransceiver for ConsoleTransceiver {
    async fn read(&mut self) -> cardlock_hardware::Result<Credential> {
        let line = self.next_presentation().await?;
        let card: CardId = line
            .parse()
            .map_err(|err| HardwareError::card_read(format!("'{line}': {err}")))?;
        Ok(Credential::new(card, self.wallet.read(card)))
    }

    async fn write(&mut self, text: &str) -> cardlock_hardware::Result<CardId> {
        let line = self.next_presentation().await?;
        let card: CardId = line
            .parse()
            .map_err(|err| HardwareError::card_write(format!("'{line}': {err}")))?;
        self.wallet
            .write(card, text)
            .map_err(|err| HardwareError::card_write(err.to_string()))?;
        Ok(card)
    }

    async fn close(&mut self) -> cardlock_hardware::Result<()> {
        self.input_closed = true;
        self.input.lines.close();
        Ok(())
    }
}
