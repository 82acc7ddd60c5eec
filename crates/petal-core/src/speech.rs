use crate::config::SpeechSection;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("failed to run speech command {0}: {1}")]
    Spawn(String, std::io::Error),
    #[error("speech command {0} failed: {1}")]
    Failed(String, String),
    #[error("failed to start speech worker: {0}")]
    Worker(std::io::Error),
}

pub trait SpeechBackend: Send {
    fn say(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Speaks through an external synthesiser such as `espeak`.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    rate: u32,
    voice: String,
}

impl CommandSpeech {
    pub fn from_config(speech: &SpeechSection) -> Self {
        Self {
            program: speech.command.clone(),
            rate: speech.rate,
            voice: speech.voice.clone(),
        }
    }

    fn args(&self, text: &str) -> Vec<String> {
        let program = Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program);
        let mut args = Vec::new();
        match program {
            "espeak" | "espeak-ng" => {
                args.extend(["-s".to_string(), self.rate.to_string()]);
                if !self.voice.is_empty() {
                    args.extend(["-v".to_string(), self.voice.clone()]);
                }
            }
            "say" => {
                args.extend(["-r".to_string(), self.rate.to_string()]);
            }
            _ => {}
        }
        args.push(text.to_string());
        args
    }
}

impl SpeechBackend for CommandSpeech {
    fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        let output = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| SpeechError::Spawn(self.program.clone(), err))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SpeechError::Failed(self.program.clone(), stderr));
        }
        Ok(())
    }
}

/// Background thread that speaks queued text one request at a time.
///
/// Requests are fire-and-forget: nothing reports back when speech starts,
/// finishes or fails.
pub struct SpeechWorker {
    sender: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl SpeechWorker {
    pub fn spawn(mut backend: impl SpeechBackend + 'static) -> Result<SpeechWorker, SpeechError> {
        let (sender, receiver) = mpsc::channel::<String>();
        let handle = thread::Builder::new()
            .name("petal-speech".to_string())
            .spawn(move || {
                for text in receiver {
                    debug!(chars = text.len(), "speaking");
                    if let Err(err) = backend.say(&text) {
                        warn!(error = %err, "speech failed");
                    }
                }
            })
            .map_err(SpeechError::Worker)?;
        Ok(SpeechWorker {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    pub fn speak(&self, text: impl Into<String>) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(text.into()).is_err() {
            warn!("speech worker is gone, dropping request");
        }
    }

    /// Waits until every queued request has been spoken.
    pub fn finish(mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("speech worker panicked");
            }
        }
    }
}
