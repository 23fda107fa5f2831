// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use log::{debug, info};

use lx200_elements::menu_model::MenuNode;

// Title shown above the top level menu entries.
const TOP_LEVEL_TITLE: &str = "Select Item:";

/// Handset keys, as sent in :EK<keycode># commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypress {
    Mode,   // 9
    Enter,  // 13
    Up,     // 68 ('D')
    GoTo,   // 71 ('G')
    Down,   // 85 ('U')
}

impl Keypress {
    pub fn from_keycode(keycode: &str) -> Option<Self> {
        match keycode.trim().parse::<u32>().ok()? {
            9 => Some(Keypress::Mode),
            13 => Some(Keypress::Enter),
            68 => Some(Keypress::Up),
            71 => Some(Keypress::GoTo),
            85 => Some(Keypress::Down),
            _ => None,
        }
    }
}

// Cursor into the handset menu tree. `path` holds the entry names from the
// top level down to the selected entry; it is never empty, and every prefix of
// it resolves in `model`. A path that does not resolve means the navigator and
// model disagree, which is a bug, so the lookups below panic rather than
// recover.
#[derive(Debug)]
pub struct MenuNavigator {
    model: &'static MenuNode,
    path: Vec<&'static str>,
}

impl MenuNavigator {
    /// Starts at the first top level entry.
    pub fn new(model: &'static MenuNode) -> Self {
        let first = *model.entry_names().first()
            .expect("menu model must have at least one top level entry");
        MenuNavigator { model, path: vec![first] }
    }

    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The selected entry.
    pub fn current(&self) -> &'static str {
        self.path[self.path.len() - 1]
    }

    /// Name of the menu containing the selected entry.
    pub fn title(&self) -> &'static str {
        if self.path.len() > 1 {
            self.path[self.path.len() - 2]
        } else {
            TOP_LEVEL_TITLE
        }
    }

    // Entries at the selected entry's level, and the selected entry's
    // position among them.
    fn peers(&self) -> (Vec<&'static str>, usize) {
        let parent_path = &self.path[..self.path.len() - 1];
        let peers = self.model.resolve(parent_path)
            .unwrap_or_else(|| panic!("menu path {:?} does not resolve",
                                      parent_path))
            .entry_names();
        let current = self.current();
        let index = peers.iter().position(|p| *p == current)
            .unwrap_or_else(|| panic!("{} is not in menu {:?}",
                                      current, parent_path));
        (peers, index)
    }

    /// Selects the following entry, wrapping to the first.
    pub fn next(&mut self) {
        let (peers, index) = self.peers();
        let last = self.path.len() - 1;
        self.path[last] = peers[(index + 1) % peers.len()];
    }

    /// Selects the preceding entry, wrapping to the last.
    pub fn previous(&mut self) {
        let (peers, index) = self.peers();
        let last = self.path.len() - 1;
        self.path[last] = peers[(index + peers.len() - 1) % peers.len()];
    }

    /// Descends into the selected entry. Returns false if it has nothing
    /// below it; the entry is then an action, and executing it leaves the
    /// path unchanged.
    pub fn enter(&mut self) -> bool {
        let entry = self.model.resolve(&self.path)
            .unwrap_or_else(|| panic!("menu path {:?} does not resolve",
                                      self.path));
        match entry.entry_names().first().copied() {
            Some(first) => {
                self.path.push(first);
                true
            }
            None => {
                info!("Executing menu item {}", self.current());
                false
            }
        }
    }

    /// Ascends to the enclosing menu. Returns false at the top level, where
    /// there is nothing to ascend to.
    pub fn exit(&mut self) -> bool {
        if self.path.len() > 1 {
            self.path.pop();
            true
        } else {
            false
        }
    }

    /// Applies a navigation key. GoTo does not navigate and is ignored here.
    pub fn handle_key(&mut self, key: Keypress) {
        match key {
            Keypress::Down => self.next(),
            Keypress::Up => self.previous(),
            Keypress::Enter => {
                self.enter();
            }
            Keypress::Mode => {
                self.exit();
            }
            Keypress::GoTo => {}
        }
        debug!("Menu path now {:?}", self.path);
    }
}

// mod tests.
