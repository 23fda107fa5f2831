// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::sync::Arc;
use std::time::Duration;

use canonical_error::{CanonicalError, invalid_argument_error};
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;

use lx200_elements::menu_model::AUTOSTAR_MENU;

use crate::command_dispatcher::CommandDispatcher;
use crate::command_framer::{CommandFramer, FramingMode};
use crate::menu_navigator::MenuNavigator;
use crate::response_buffer::ResponseBuffer;
use crate::telescope_state::TelescopeState;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    // Largest single write to the client.
    chunk_size: usize,

    // Pause between consecutive chunk writes.
    chunk_delay: Duration,

    // Pause after each read/process/drain pass.
    idle_delay: Duration,

    framing_mode: FramingMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            chunk_size: 16,
            chunk_delay: Duration::ZERO,
            idle_delay: Duration::from_millis(200),
            framing_mode: FramingMode::Legacy,
        }
    }
}

impl SessionConfig {
    pub fn new(chunk_size: usize, chunk_delay: Duration, idle_delay: Duration,
               framing_mode: FramingMode) -> Result<Self, CanonicalError> {
        if chunk_size == 0 {
            return Err(invalid_argument_error(
                "chunk_size must be positive; got 0"));
        }
        Ok(SessionConfig { chunk_size, chunk_delay, idle_delay, framing_mode })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn framing_mode(&self) -> FramingMode {
        self.framing_mode
    }
}

// One connected client. Everything mutable is owned here, so sessions share
// nothing but the (immutable) dispatcher.
pub struct Lx200Session {
    config: SessionConfig,
    dispatcher: Arc<CommandDispatcher>,
    framer: CommandFramer,
    state: TelescopeState,
    navigator: MenuNavigator,
    send_buffer: ResponseBuffer,
}

impl Lx200Session {
    pub fn new(config: SessionConfig, dispatcher: Arc<CommandDispatcher>)
               -> Self {
        let navigator = MenuNavigator::new(&AUTOSTAR_MENU);
        let mut state = TelescopeState::new();
        state.show_menu_position(&navigator);
        Lx200Session {
            framer: CommandFramer::new(config.framing_mode),
            config,
            dispatcher,
            state,
            navigator,
            send_buffer: ResponseBuffer::new(),
        }
    }

    pub fn state(&self) -> &TelescopeState {
        &self.state
    }

    pub fn navigator(&self) -> &MenuNavigator {
        &self.navigator
    }

    /// Frames `input` and dispatches each command in it, queueing the replies.
    pub fn process_input(&mut self, input: &[u8]) {
        let commands: Vec<String> = self.framer.frame(input).collect();
        for command in commands {
            self.dispatcher.process(&mut self.state, &mut self.navigator,
                                    &command, &mut self.send_buffer);
        }
    }

    /// Writes out all queued replies, at most `chunk_size` bytes per write.
    pub async fn drain<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where W: AsyncWrite + Unpin {
        while self.send_buffer.has_data() {
            let chunk = self.send_buffer.pop(self.config.chunk_size);
            debug!("Writing to client: {:?}", String::from_utf8_lossy(&chunk));
            writer.write_all(&chunk).await?;
            writer.flush().await?;
            if self.send_buffer.has_data() && !self.config.chunk_delay.is_zero() {
                sleep(self.config.chunk_delay).await;
            }
        }
        Ok(())
    }

    /// Serves the client until it closes the connection (Ok) or the
    /// connection fails (Err).
    pub async fn run<S>(&mut self, stream: &mut S) -> std::io::Result<()>
    where S: AsyncRead + AsyncWrite + Unpin {
        let mut buffer = [0; 1024];

        debug!("Starting to read from LX200 connection ({:?} framing)",
               self.framer.mode());
        loop {
            let n = match stream.read(&mut buffer).await {
                Ok(0) => {
                    debug!("Client closed connection");
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    // Interruption is recoverable, try reading again
                    continue;
                }
                Err(e) => return Err(e),
            };
            debug!("Received: {:?}", String::from_utf8_lossy(&buffer[..n]));
            self.process_input(&buffer[..n]);
            self.drain(stream).await?;
            sleep(self.config.idle_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::duplex;

    use super::*;

    fn fast_config(chunk_size: usize, framing_mode: FramingMode)
                   -> SessionConfig {
        SessionConfig::new(chunk_size, Duration::ZERO, Duration::ZERO,
                           framing_mode).unwrap()
    }

    fn new_session(config: SessionConfig) -> Lx200Session {
        Lx200Session::new(config, Arc::new(CommandDispatcher::new()))
    }

    #[test]
    fn test_config_validation() {
        assert!(SessionConfig::new(0, Duration::ZERO, Duration::ZERO,
                                   FramingMode::Legacy).is_err());
        let config = SessionConfig::default();
        assert_eq!(config.chunk_size(), 16);
        assert_eq!(config.framing_mode(), FramingMode::Legacy);

        let session = new_session(fast_config(16, FramingMode::Buffered));
        assert_eq!(session.framer.mode(), FramingMode::Buffered);
    }

    #[test]
    fn test_sessions_are_independent() {
        let dispatcher = Arc::new(CommandDispatcher::new());
        let mut s1 = Lx200Session::new(SessionConfig::default(),
                                       dispatcher.clone());
        let s2 = Lx200Session::new(SessionConfig::default(), dispatcher);
        s1.process_input(b":SF042#:EK85#");
        assert_eq!(s1.state().find_field_diameter, 42);
        assert_eq!(s1.navigator().path(), ["Event"]);
        assert!(s1.send_buffer.has_data());

        assert_eq!(s2.state().find_field_diameter, 15);
        assert_eq!(s2.navigator().path(), ["Object"]);
        assert!(!s2.send_buffer.has_data());
    }

    #[test]
    fn test_silent_command_queues_nothing() {
        let mut session = new_session(SessionConfig::default());
        session.process_input(b":RC#");
        assert!(!session.send_buffer.has_data());
        session.process_input(b":ZZ#");
        assert_eq!(session.send_buffer.pop(16), [0x15]);
    }

    #[tokio::test]
    async fn test_drain_writes_chunks_in_order() {
        let mut session = new_session(fast_config(16, FramingMode::Legacy));
        session.send_buffer.append(b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ");

        let (mut client, mut server) = duplex(1024);
        session.drain(&mut server).await.unwrap();
        assert!(!session.send_buffer.has_data());
        drop(server);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[tokio::test]
    async fn test_drain_respects_chunk_size() {
        let mut session = new_session(fast_config(4, FramingMode::Legacy));
        session.send_buffer.append(b"18:54:36#");

        // A pipe that holds exactly one chunk forces one write per chunk.
        let (mut client, mut server) = duplex(4);
        let reader = tokio::spawn(async move {
            let mut chunks = Vec::new();
            let mut buf = [0; 16];
            loop {
                let n = client.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            chunks
        });
        session.drain(&mut server).await.unwrap();
        drop(server);

        let chunks = reader.await.unwrap();
        assert!(chunks.iter().all(|c| c.len() <= 4));
        assert_eq!(chunks.concat(), b"18:54:36#");
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let mut session = new_session(fast_config(16, FramingMode::Legacy));
        let (mut client, mut server) = duplex(1024);

        let handle = tokio::spawn(async move {
            let result = session.run(&mut server).await;
            (session, result)
        });

        client.write_all(b":GR#:GD#").await.unwrap();
        let mut expected = b"18:54:36#+33*3'36#".to_vec();
        let mut received = vec![0; expected.len()];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);

        client.write_all(b":SF015#").await.unwrap();
        expected = b"1".to_vec();
        received = vec![0; expected.len()];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);

        // Closing our end is a clean end of session.
        drop(client);
        let (session, result) = handle.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(session.state().find_field_diameter, 15);
    }

    #[tokio::test]
    async fn test_run_display_reply_spans_chunks() {
        let mut session = new_session(fast_config(16, FramingMode::Legacy));
        let (mut client, mut server) = duplex(1024);
        let handle = tokio::spawn(async move {
            session.run(&mut server).await
        });

        client.write_all(b":EK85#:ED#").await.unwrap();
        let mut received = vec![0; 34];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(received[0], 0x97);
        assert_eq!(&received[1..], b"Select Item:    Event           #");

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_fails_when_client_goes_away() {
        let mut session = new_session(fast_config(16, FramingMode::Legacy));
        let (mut client, mut server) = duplex(1024);

        // The command is read, but its reply has nowhere to go.
        client.write_all(b":GR#").await.unwrap();
        drop(client);
        let err = session.run(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}  // mod tests.
