// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use lx200_elements::sexagesimal::to_dms_truncated;

use crate::menu_navigator::MenuNavigator;

/// Width of each of the two handset display lines.
pub const DISPLAY_WIDTH: usize = 16;

/// Leads every handset display reply.
pub const DISPLAY_MARKER: u8 = 0x97;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    #[default]
    AltAz,
    Polar,
    GermanEquatorial,
    Land,
}

impl MountMode {
    // Character used for the mount in status replies.
    pub fn code(&self) -> char {
        match self {
            MountMode::AltAz => 'A',
            MountMode::Polar => 'P',
            MountMode::GermanEquatorial => 'G',
            MountMode::Land => 'L',
        }
    }
}

// State of the emulated telescope for one client session.
#[derive(Debug)]
pub struct TelescopeState {
    // Placeholder position; nothing moves it.
    pub ra: f64,  // Hours.
    pub dec: f64,  // Degrees, -90..90.

    pub mount_mode: MountMode,

    // Degrees.
    pub find_field_diameter: u32,

    // Always exactly DISPLAY_WIDTH characters.
    display_line1: String,
    display_line2: String,

    // Site as set by the client, kept in the client's own format for
    // retrieval. Latitude: sDD*MM. Longitude: DDD*MM, degrees west.
    pub site_latitude: String,
    pub site_longitude: String,
}

impl Default for TelescopeState {
    fn default() -> Self {
        TelescopeState::new()
    }
}

impl TelescopeState {
    pub fn new() -> Self {
        TelescopeState {
            ra: 18.91,
            dec: 33.06,
            mount_mode: MountMode::AltAz,
            find_field_diameter: 15,
            display_line1: fit_display_line(""),
            display_line2: fit_display_line(""),
            site_latitude: "+00*00".to_string(),
            site_longitude: "000*00".to_string(),
        }
    }

    pub fn display_line1(&self) -> &str {
        &self.display_line1
    }

    pub fn display_line2(&self) -> &str {
        &self.display_line2
    }

    pub fn set_display_line1(&mut self, text: &str) {
        self.display_line1 = fit_display_line(text);
    }

    pub fn set_display_line2(&mut self, text: &str) {
        self.display_line2 = fit_display_line(text);
    }

    /// Shows the navigator's position: the enclosing menu on the first line,
    /// the selected entry on the second.
    pub fn show_menu_position(&mut self, navigator: &MenuNavigator) {
        self.set_display_line1(navigator.title());
        self.set_display_line2(navigator.current());
    }

    /// Right ascension as H:M:S#. Fields are truncated, not rounded, and not
    /// zero padded.
    pub fn get_ra(&self) -> String {
        let (h, m, s) = to_dms_truncated(self.ra);
        format!("{h}:{m}:{s}#")
    }

    /// Declination as sD*M'S# where s is always present. Same truncation
    /// rule as get_ra().
    pub fn get_dec(&self) -> String {
        let sign = if self.dec < 0.0 { "-" } else { "+" };
        let (d, m, s) = to_dms_truncated(self.dec);
        format!("{sign}{d}*{m}'{s}#")
    }

    pub fn get_find_field_diameter(&self) -> String {
        format!("{:03}#", self.find_field_diameter)
    }

    // Mount, tracking, aligned.
    pub fn get_status(&self) -> String {
        format!("{}T1#", self.mount_mode.code())
    }

    /// The handset display reply: marker byte, both lines, terminator.
    pub fn get_display(&self) -> Vec<u8> {
        let mut reply = Vec::with_capacity(2 + 2 * DISPLAY_WIDTH);
        reply.push(DISPLAY_MARKER);
        reply.extend_from_slice(self.display_line1.as_bytes());
        reply.extend_from_slice(self.display_line2.as_bytes());
        reply.push(b'#');
        reply
    }
}

// Truncates or space-pads `text` to DISPLAY_WIDTH characters.
fn fit_display_line(text: &str) -> String {
    format!("{:<width$.width$}", text, width = DISPLAY_WIDTH)
}

#[cfg(test)]
mod tests {
    use lx200_elements::menu_model::AUTOSTAR_MENU;

    use super::*;

    // Matches ^[+-]\d+\*\d{1,2}'\d{1,2}#$
    fn is_dec_format(s: &str) -> bool {
        let Some(body) = s.strip_suffix('#') else { return false };
        let mut chars = body.chars();
        if !matches!(chars.next(), Some('+') | Some('-')) {
            return false;
        }
        let rest: String = chars.collect();
        let Some((deg, rest)) = rest.split_once('*') else { return false };
        let Some((min, sec)) = rest.split_once('\'') else { return false };
        let digits = |f: &str, max: usize| {
            !f.is_empty() && f.len() <= max && f.chars().all(|c| c.is_ascii_digit())
        };
        digits(deg, usize::MAX) && digits(min, 2) && digits(sec, 2)
    }

    #[test]
    fn test_fit_display_line() {
        assert_eq!(fit_display_line("Object"), "Object          ");
        assert_eq!(fit_display_line(""), " ".repeat(16));
        assert_eq!(fit_display_line("Next 1st Quarter"), "Next 1st Quarter");
        assert_eq!(fit_display_line("A very long display line"),
                   "A very long disp");
    }

    #[test]
    fn test_get_ra_and_dec() {
        let mut state = TelescopeState::new();
        assert_eq!(state.get_ra(), "18:54:36#");
        assert_eq!(state.get_dec(), "+33*3'36#");

        state.ra = 1.5;
        state.dec = -10.5;
        assert_eq!(state.get_ra(), "1:30:0#");
        assert_eq!(state.get_dec(), "-10*30'0#");

        state.dec = 0.0;
        assert_eq!(state.get_dec(), "+0*0'0#");
    }

    #[test]
    fn test_dec_format_over_range() {
        let mut state = TelescopeState::new();
        for tenth in -900..=900 {
            state.dec = tenth as f64 / 10.0 + 0.0123;
            if state.dec > 90.0 {
                state.dec = 90.0;
            }
            let dec = state.get_dec();
            assert!(is_dec_format(&dec), "Bad format: {}", dec);
            assert_eq!(dec.starts_with('+'), state.dec >= 0.0, "{}", dec);
        }
    }

    #[test]
    fn test_find_field_diameter_and_status() {
        let mut state = TelescopeState::new();
        assert_eq!(state.get_find_field_diameter(), "015#");
        state.find_field_diameter = 7;
        assert_eq!(state.get_find_field_diameter(), "007#");
        state.find_field_diameter = 999;
        assert_eq!(state.get_find_field_diameter(), "999#");

        assert_eq!(state.get_status(), "AT1#");
        state.mount_mode = MountMode::Polar;
        assert_eq!(state.get_status(), "PT1#");
    }

    #[test]
    fn test_display() {
        let mut state = TelescopeState::new();
        let navigator = MenuNavigator::new(&AUTOSTAR_MENU);
        state.show_menu_position(&navigator);
        assert_eq!(state.display_line1(), "Select Item:    ");
        assert_eq!(state.display_line2(), "Object          ");

        let display = state.get_display();
        assert_eq!(display.len(), 34);
        assert_eq!(display[0], DISPLAY_MARKER);
        assert_eq!(&display[1..33], b"Select Item:    Object          ");
        assert_eq!(display[33], b'#');
    }
}  // mod tests.
