//! Remote control via Unix socket
//!
//! Accepts line commands over a Unix socket and turns them into the same
//! actions as the keyboard shortcuts.

use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

const SOCKET_PATH: &str = "/tmp/riftgate.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Close,
    /// Toggle the portal effect (the `u` key)
    ToggleMode,
    /// Toggle automatic open/close cycling (the `d` key)
    ToggleDemo,
    Quit,
}

impl Command {
    /// Parse one command line, case-insensitive
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "open" | "o" => Some(Command::Open),
            "close" | "c" => Some(Command::Close),
            "mode" | "u" => Some(Command::ToggleMode),
            "demo" | "d" => Some(Command::ToggleDemo),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Listen on the default socket path
    pub fn new() -> Result<Self> {
        Self::bind(SOCKET_PATH)
    }

    /// Listen on `path`, replacing any stale socket file
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)
            .map_err(|e| Error::Socket(format!("failed to bind {}: {}", path.display(), e)))?;

        // Non-blocking so the loop can notice a closed socket
        listener
            .set_nonblocking(true)
            .map_err(|e| Error::Socket(format!("failed to set non-blocking: {}", e)))?;

        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::listener_loop(&listener, &sender);
        });

        Ok(Self {
            receiver,
            path,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: &UnixListener, sender: &Sender<Command>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, &sender);
                    });
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                },
                Err(_) => break,
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: &Sender<Command>) {
        // Accepted sockets inherit non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(std::result::Result::ok) {
            match Command::parse(&line) {
                Some(cmd) => {
                    debug!(?cmd, "control command");
                    if sender.send(cmd).is_err() {
                        break;
                    }
                },
                None => debug!(line = line.trim(), "unknown control command"),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.receiver.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    /// Path the controller is listening on
    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Instant;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("open"), Some(Command::Open));
        assert_eq!(Command::parse("  CLOSE \n"), Some(Command::Close));
        assert_eq!(Command::parse("u"), Some(Command::ToggleMode));
        assert_eq!(Command::parse("mode"), Some(Command::ToggleMode));
        assert_eq!(Command::parse("d"), Some(Command::ToggleDemo));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("warp 9"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_socket_delivers_commands() {
        let path = std::env::temp_dir().join(format!("riftgate-test-{}.sock", std::process::id()));
        let controller = Controller::bind(&path).unwrap();

        let mut client = UnixStream::connect(&path).unwrap();
        client.write_all(b"open\nnonsense\ndemo\nquit\n").unwrap();
        drop(client);

        let deadline = Instant::now() + Duration::from_secs(3);
        let mut received = Vec::new();
        while received.len() < 3 && Instant::now() < deadline {
            received.extend(controller.poll());
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(received, vec![Command::Open, Command::ToggleDemo, Command::Quit]);

        drop(controller);
        assert!(!path.exists());
    }
}
