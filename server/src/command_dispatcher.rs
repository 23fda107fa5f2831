// Implementation of the Meade LX200/Autostar command set for the handset
// emulator.
//
// References for LX200 command set include:
//    https://www.astro.louisville.edu/software/xmtel/archive/xmtel-indi-6.0/xmtel-6.0l/support/lx200/CommandSet.html
//    https://interactiveastronomy.com/lx-200gps_telescope_protocol_2010-10.pdf
//
// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::collections::HashMap;

use chrono::{DateTime, Local, TimeZone};
use log::{debug, info, warn};

use lx200_elements::sexagesimal::parse_location;

use crate::menu_navigator::{Keypress, MenuNavigator};
use crate::response_buffer::ResponseBuffer;
use crate::telescope_state::{MountMode, TelescopeState};

/// "Telescope is busy" reply to anything we cannot route.
pub const NACK: u8 = 0x15;

// A handler receives the whole command (without its '#') and returns the reply
// to send, if any.
type Handler =
    fn(&mut TelescopeState, &mut MenuNavigator, &str) -> Option<Vec<u8>>;

// Routes commands in two steps: the first two characters (":G") select a
// command family, characters 1..3 ("GR") select the handler within it. The
// table is built once and never modified, so a single dispatcher can be shared
// by all sessions.
pub struct CommandDispatcher {
    families: HashMap<&'static str, HashMap<&'static str, Handler>>,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        CommandDispatcher::new()
    }
}

impl CommandDispatcher {
    pub fn new() -> Self {
        let alignment: [(&'static str, Handler); 4] = [
            ("AA", set_mount_mode),
            ("AG", set_mount_mode),
            ("AL", set_mount_mode),
            ("AP", set_mount_mode),
        ];
        let display: [(&'static str, Handler); 2] = [
            ("ED", get_display),
            ("EK", press_key),
        ];
        let information: [(&'static str, Handler); 11] = [
            ("G0", get_alignment_menu_entry),
            ("GC", get_local_date),
            ("GD", get_dec),
            ("GF", get_find_field_diameter),
            ("GG", get_utc_offset),
            ("GL", get_local_time),
            ("GR", get_ra),
            ("GV", get_firmware_info),
            ("GW", get_status),
            ("Gg", get_longitude),
            ("Gt", get_latitude),
        ];
        let slew_rate: [(&'static str, Handler); 4] = [
            ("RC", set_slew_rate),
            ("RG", set_slew_rate),
            ("RM", set_slew_rate),
            ("RS", set_slew_rate),
        ];
        let set: [(&'static str, Handler); 3] = [
            ("SF", set_find_field_diameter),
            ("Sg", set_longitude),
            ("St", set_latitude),
        ];

        let mut families = HashMap::new();
        families.insert(":A", HashMap::from(alignment));
        families.insert(":E", HashMap::from(display));
        families.insert(":G", HashMap::from(information));
        families.insert(":R", HashMap::from(slew_rate));
        families.insert(":S", HashMap::from(set));
        CommandDispatcher { families }
    }

    /// Routes `command` (e.g. ":GR" or ":SF015") to its handler and returns
    /// the reply, if the command has one. Unroutable commands get NACK.
    pub fn dispatch(&self, state: &mut TelescopeState,
                    navigator: &mut MenuNavigator, command: &str)
                    -> Option<Vec<u8>> {
        let family = match command.get(..2).and_then(|f| self.families.get(f)) {
            Some(family) => family,
            None => {
                info!("Unknown command: {}", command);
                return nack();
            }
        };
        match command.get(1..3).and_then(|key| family.get(key)) {
            Some(handler) => handler(state, navigator, command),
            None => {
                info!("Unknown command: {}", command);
                nack()
            }
        }
    }

    /// As dispatch(), appending the reply (if any) to `send_buffer`.
    pub fn process(&self, state: &mut TelescopeState,
                   navigator: &mut MenuNavigator, command: &str,
                   send_buffer: &mut ResponseBuffer) {
        debug!("Received command: {}", command);
        if let Some(reply) = self.dispatch(state, navigator, command) {
            debug!("Queueing reply: {:?}", String::from_utf8_lossy(&reply));
            send_buffer.append(&reply);
        }
    }
}

fn reply(s: &str) -> Option<Vec<u8>> {
    Some(s.as_bytes().to_vec())
}

fn nack() -> Option<Vec<u8>> {
    Some(vec![NACK])
}

fn get_failure() -> Option<Vec<u8>> {
    reply("0")
}

fn get_success() -> Option<Vec<u8>> {
    reply("1")
}

// Characters start..end of `cmd`, or as many of them as exist.
fn param(cmd: &str, start: usize, end: usize) -> &str {
    cmd.get(start..end).or_else(|| cmd.get(start..)).unwrap_or("")
}

// --- Alignment (:A) ---

fn set_mount_mode(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                  cmd: &str) -> Option<Vec<u8>> {
    state.mount_mode = match &cmd[1..3] {
        "AA" => MountMode::AltAz,
        "AG" => MountMode::GermanEquatorial,
        "AL" => MountMode::Land,
        _ => MountMode::Polar,
    };
    info!("Mount mode set to {:?}", state.mount_mode);
    None
}

// --- Handset display (:E) ---

fn get_display(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
               _cmd: &str) -> Option<Vec<u8>> {
    Some(state.get_display())
}

// The handset does not answer key presses; the client polls the display
// with :ED to see their effect.
fn press_key(state: &mut TelescopeState, navigator: &mut MenuNavigator,
             cmd: &str) -> Option<Vec<u8>> {
    let keycode = param(cmd, 3, cmd.len());
    match Keypress::from_keycode(keycode) {
        Some(Keypress::GoTo) => {
            info!("GoTo pressed on {}", navigator.current());
            state.set_display_line2("Slewing");
        }
        Some(key) => {
            navigator.handle_key(key);
            state.show_menu_position(navigator);
        }
        None => {
            debug!("Ignoring keycode {:?}", keycode);
        }
    }
    None
}

// --- Telescope information (:G) ---

fn get_alignment_menu_entry(_state: &mut TelescopeState,
                            _navigator: &mut MenuNavigator, _cmd: &str)
                            -> Option<Vec<u8>> {
    reply("1#")
}

fn get_ra(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
          _cmd: &str) -> Option<Vec<u8>> {
    reply(&state.get_ra())
}

fn get_dec(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
           _cmd: &str) -> Option<Vec<u8>> {
    reply(&state.get_dec())
}

fn get_find_field_diameter(state: &mut TelescopeState,
                           _navigator: &mut MenuNavigator, _cmd: &str)
                           -> Option<Vec<u8>> {
    reply(&state.get_find_field_diameter())
}

fn get_status(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
              _cmd: &str) -> Option<Vec<u8>> {
    reply(&state.get_status())
}

// :GVD, :GVN, :GVP, :GVT
fn get_firmware_info(_state: &mut TelescopeState,
                     _navigator: &mut MenuNavigator, cmd: &str)
                     -> Option<Vec<u8>> {
    match param(cmd, 3, 4) {
        "D" => reply("Aug 20 2028#"),
        "N" => reply("43Eg#"),
        "P" => reply("Autostar#"),
        "T" => reply("20:12:00#"),
        _ => {
            info!("Unknown command: {}", cmd);
            nack()
        }
    }
}

fn get_local_time(_state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                  _cmd: &str) -> Option<Vec<u8>> {
    reply(&format_time(&Local::now()))
}

fn get_local_date(_state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                  _cmd: &str) -> Option<Vec<u8>> {
    reply(&format_date(&Local::now()))
}

fn get_utc_offset(_state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                  _cmd: &str) -> Option<Vec<u8>> {
    reply(&format_utc_offset(&Local::now()))
}

fn get_latitude(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                _cmd: &str) -> Option<Vec<u8>> {
    reply(&format!("{}#", state.site_latitude))
}

fn get_longitude(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                 _cmd: &str) -> Option<Vec<u8>> {
    reply(&format!("{}#", state.site_longitude))
}

fn format_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where Tz::Offset: std::fmt::Display {
    dt.format("%H:%M:%S#").to_string()
}

fn format_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where Tz::Offset: std::fmt::Display {
    dt.format("%D#").to_string()
}

// sHH.F# where F is the quarter hour as .0, .2, .5 or .8.
fn format_utc_offset<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where Tz::Offset: std::fmt::Display {
    let timezone = dt.format("%z").to_string();
    let hours = &timezone[0..3];
    let partial = match &timezone[3..] {
        "15" => ".2",
        "30" => ".5",
        "45" => ".8",
        _ => ".0",
    };
    format!("{hours}{partial}#")
}

// --- Slew rate (:R) ---

// Rate changes are accepted silently; nothing here moves.
fn set_slew_rate(_state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                 cmd: &str) -> Option<Vec<u8>> {
    debug!("Slew rate command {}", cmd);
    None
}

// --- Telescope set (:S) ---

fn set_find_field_diameter(state: &mut TelescopeState,
                           _navigator: &mut MenuNavigator, cmd: &str)
                           -> Option<Vec<u8>> {
    // The command is expected to be ":SFNNN". The client is trusted to send
    // a sensible diameter; there is no range check.
    match param(cmd, 3, 6).trim().parse::<u32>() {
        Ok(diameter) => {
            info!("Field diameter set to {}", diameter);
            state.find_field_diameter = diameter;
            get_success()
        }
        Err(e) => {
            warn!("Error parsing field diameter in {}: {}", cmd, e);
            get_failure()
        }
    }
}

// Site strings are sDD*MM or DDD*MM; any separator is accepted.
fn parse_site(site: &str) -> Option<f64> {
    parse_location(site.get(0..3)?, site.get(4..6)?)
}

fn set_latitude(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                cmd: &str) -> Option<Vec<u8>> {
    // The command is expected to be ":StsDD*MM" where s is +/-
    match cmd.get(3..9) {
        Some(site) if parse_site(site).is_some() => {
            debug!("Set latitude {}", site);
            state.site_latitude = site.to_string();
            get_success()
        }
        _ => {
            warn!("Unexpected latitude, cmd: {}", cmd);
            get_failure()
        }
    }
}

fn set_longitude(state: &mut TelescopeState, _navigator: &mut MenuNavigator,
                 cmd: &str) -> Option<Vec<u8>> {
    // The command is expected to be ":SgDDD*MM"
    match cmd.get(3..9) {
        Some(site) if parse_site(site).is_some() => {
            debug!("Set longitude {}", site);
            state.site_longitude = site.to_string();
            get_success()
        }
        _ => {
            warn!("Unexpected longitude, cmd: {}", cmd);
            get_failure()
        }
    }
}

// mod tests.
