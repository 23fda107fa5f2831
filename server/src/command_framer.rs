// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use log::{debug, warn};
use memchr::memchr_iter;

/// Terminates every command and every '#'-terminated response.
pub const COMMAND_TERMINATOR: u8 = b'#';

/// First character of every command.
pub const COMMAND_PREFIX: char = ':';

// Upper bound on unterminated input carried between reads in Buffered mode.
const MAX_PENDING_LEN: usize = 1024;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    // Input after the last '#' of a read is dropped, as the handset emulator
    // always did. A command split across two reads is lost.
    #[default]
    Legacy,

    // Input after the last '#' of a read is held and prepended to the next
    // read, so split commands are reassembled.
    Buffered,
}

// Splits the incoming byte stream into commands. LX200 clients terminate
// each command with '#', but a single read may hold several commands (e.g.
// SkySafari sends ":RS#:GR#" together) or only part of one.
#[derive(Debug, Default)]
pub struct CommandFramer {
    mode: FramingMode,

    // Unterminated tail of previous input; only used in Buffered mode.
    pending: Vec<u8>,
}

impl CommandFramer {
    pub fn new(mode: FramingMode) -> Self {
        CommandFramer { mode, pending: Vec::new() }
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Returns the commands found in `input` (without their terminators), in
    /// arrival order. Fragments that are too short or lack the ':' prefix are
    /// dropped; this includes the empty fragment produced by Stellarium's
    /// leading '#'.
    pub fn frame(&mut self, input: &[u8]) -> impl Iterator<Item = String> {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(input);

        let mut candidates = Vec::new();
        let mut start = 0;
        for end in memchr_iter(COMMAND_TERMINATOR, &data) {
            candidates.push(String::from_utf8_lossy(&data[start..end])
                            .into_owned());
            start = end + 1;
        }

        let tail = &data[start..];
        if !tail.is_empty() {
            match self.mode {
                FramingMode::Legacy => {
                    debug!("Dropping unterminated input: {:?}",
                           String::from_utf8_lossy(tail));
                }
                FramingMode::Buffered => {
                    if tail.len() > MAX_PENDING_LEN {
                        warn!("Discarding {} bytes of unterminated input",
                              tail.len());
                    } else {
                        self.pending = tail.to_vec();
                    }
                }
            }
        }
        candidates.into_iter().filter(is_command)
    }

    /// Number of bytes held over for the next read.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn is_command(candidate: &String) -> bool {
    let mut chars = candidate.chars();
    let accept = chars.next() == Some(COMMAND_PREFIX) && chars.next().is_some();
    if !accept && !candidate.is_empty() {
        debug!("Ignoring fragment: {:?}", candidate);
    }
    accept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_all(framer: &mut CommandFramer, input: &[u8]) -> Vec<String> {
        framer.frame(input).collect()
    }

    #[test]
    fn test_single_and_multiple_commands() {
        let mut framer = CommandFramer::new(FramingMode::Legacy);
        assert_eq!(frame_all(&mut framer, b":GR#"), [":GR"]);
        assert_eq!(frame_all(&mut framer, b":GR#:GD#"), [":GR", ":GD"]);
        assert_eq!(frame_all(&mut framer, b":RS#:GR#:SF015#"),
                   [":RS", ":GR", ":SF015"]);
    }

    #[test]
    fn test_noise_is_dropped() {
        let mut framer = CommandFramer::new(FramingMode::Legacy);
        // Stellarium sends a leading '#'.
        assert_eq!(frame_all(&mut framer, b"#:GR#"), [":GR"]);
        // Too short, or missing the prefix.
        assert!(frame_all(&mut framer, b":#").is_empty());
        assert!(frame_all(&mut framer, b"GR#").is_empty());
        assert!(frame_all(&mut framer, b"\x06#").is_empty());
        assert!(frame_all(&mut framer, b"##").is_empty());
        assert_eq!(frame_all(&mut framer, b"x#:GD#:#"), [":GD"]);
    }

    #[test]
    fn test_legacy_drops_partial_command() {
        let mut framer = CommandFramer::new(FramingMode::Legacy);
        assert_eq!(frame_all(&mut framer, b":GR#:G"), [":GR"]);
        assert_eq!(framer.pending_len(), 0);
        // A complete-looking tail is still unterminated, hence dropped.
        assert_eq!(frame_all(&mut framer, b":GR#:GD"), [":GR"]);
        assert_eq!(framer.pending_len(), 0);
        // The remainder of the split command arrives alone and is noise.
        assert!(frame_all(&mut framer, b"D#").is_empty());
        // Unterminated command without any '#'.
        assert!(frame_all(&mut framer, b":GD").is_empty());
    }

    #[test]
    fn test_buffered_reassembles_partial_command() {
        let mut framer = CommandFramer::new(FramingMode::Buffered);
        assert_eq!(frame_all(&mut framer, b":GR#:G"), [":GR"]);
        assert_eq!(framer.pending_len(), 2);
        assert_eq!(frame_all(&mut framer, b"D#"), [":GD"]);
        assert_eq!(framer.pending_len(), 0);

        assert!(frame_all(&mut framer, b":SF0").is_empty());
        assert!(frame_all(&mut framer, b"1").is_empty());
        assert_eq!(frame_all(&mut framer, b"5#"), [":SF015"]);
    }

    #[test]
    fn test_buffered_discards_runaway_input() {
        let mut framer = CommandFramer::new(FramingMode::Buffered);
        let garbage = vec![b'x'; MAX_PENDING_LEN + 1];
        assert!(frame_all(&mut framer, &garbage).is_empty());
        assert_eq!(framer.pending_len(), 0);
        assert_eq!(frame_all(&mut framer, b":GW#"), [":GW"]);
    }
}  // mod tests.
