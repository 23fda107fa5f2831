// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// The on-device menu hierarchy of an Autostar handset, used as read-only
// traversal data by the menu navigator.

#[derive(Debug)]
pub enum MenuNode {
    // Submenus, in the order the handset presents them.
    Branch(&'static [(&'static str, MenuNode)]),
    // Terminal level: the names of the actions available here. May be empty.
    Leaf(&'static [&'static str]),
}

/// The result of looking up a path in the menu tree. A path either ends on a
/// node (which may have entries of its own) or on an action within a leaf.
#[derive(Debug, Clone, Copy)]
pub enum MenuEntry {
    Node(&'static MenuNode),
    Action(&'static str),
}

impl MenuNode {
    /// The names selectable at this level, in presentation order.
    pub fn entry_names(&self) -> Vec<&'static str> {
        match self {
            MenuNode::Branch(children) => {
                children.iter().map(|(name, _)| *name).collect()
            }
            MenuNode::Leaf(actions) => actions.to_vec(),
        }
    }

    pub fn child(&'static self, name: &str) -> Option<MenuEntry> {
        match self {
            MenuNode::Branch(children) => children
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, node)| MenuEntry::Node(node)),
            MenuNode::Leaf(actions) => actions
                .iter()
                .find(|a| **a == name)
                .map(|a| MenuEntry::Action(*a)),
        }
    }

    /// Follows `path` from this node. Returns None if any element of the path
    /// does not exist at its level. An empty path resolves to this node.
    pub fn resolve(&'static self, path: &[&str]) -> Option<MenuEntry> {
        let mut entry = MenuEntry::Node(self);
        for name in path {
            entry = match entry {
                MenuEntry::Node(node) => node.child(name)?,
                // Actions have nothing below them.
                MenuEntry::Action(_) => return None,
            };
        }
        Some(entry)
    }
}

impl MenuEntry {
    /// Entries one level below this one; empty for actions and empty leaves.
    pub fn entry_names(&self) -> Vec<&'static str> {
        match self {
            MenuEntry::Node(node) => node.entry_names(),
            MenuEntry::Action(_) => Vec::new(),
        }
    }
}

/// The Autostar top level menu and its submenus.
pub static AUTOSTAR_MENU: MenuNode = MenuNode::Branch(&[
    ("Object", MenuNode::Branch(&[
        ("Solar System", MenuNode::Leaf(&[
            "Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus",
            "Neptune", "Pluto", "Moon", "Asteroids", "Comets",
        ])),
        ("Constellation", MenuNode::Leaf(&[])),
        ("Deep Sky", MenuNode::Leaf(&[
            "Named Object", "Galaxies", "Nebulas", "Planetary Nebula",
            "Star Clusters", "Quasars", "Black Holes", "Messier Objects",
            "Caldwell Objects", "NGC Objects", "IC Objects", "Abell Objects",
        ])),
        ("Star", MenuNode::Leaf(&[
            "Named", "SAO Catalog", "HD Catalog", "HR Catalog", "Multiple",
            "GCVS", "Nearby", "With Planets",
        ])),
        ("Satellite", MenuNode::Leaf(&["Select", "Add", "Delete", "Edit"])),
        ("User Objects", MenuNode::Leaf(&["Select", "Add", "Delete", "Edit"])),
        ("Landmarks", MenuNode::Leaf(&["Select", "Add", "Delete"])),
        ("Identify", MenuNode::Leaf(&[])),
        ("Browse", MenuNode::Leaf(&["Start Search", "Edit Parameters"])),
    ])),
    ("Event", MenuNode::Leaf(&[
        "Sunrise", "Sunset", "Moonrise", "Moonset", "Moon Phases",
        "Next Full Moon", "Next New Moon", "Next 1st Quarter",
        "Next 3rd Quarter", "Meteor Showers", "Solar Eclipse", "Lunar Eclipse",
        "Min. of Algol", "Autumn Equinox", "Vernal Equinox", "Winter Solstice",
        "Summer Solstice",
    ])),
    ("Guided Tour", MenuNode::Leaf(&[
        "Tonight's Best", "A Star's Life", "How Far is Far",
    ])),
    ("Glossary", MenuNode::Leaf(&[
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N",
        "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ])),
    ("Utilities", MenuNode::Leaf(&[
        "Timer", "Alarm", "Eyepiece FOV", "Brightness Adj", "Park Scope",
        "Sleep Scope", "Battery Alarm", "Landmark Survey", "Aux Feature",
        "Display Options",
    ])),
    ("Setup", MenuNode::Branch(&[
        ("Align", MenuNode::Leaf(&["Easy", "One Star", "Two Star"])),
        ("Date", MenuNode::Leaf(&[])),
        ("Time", MenuNode::Leaf(&[])),
        ("Daylight Saving", MenuNode::Leaf(&[])),
        ("Telescope", MenuNode::Leaf(&[
            "Mount", "Telescope Model", "Focal Length", "Az Ratio",
            "Alt Ratio", "Az Percent", "Alt Percent", "Train Drive",
            "Tracking Rate", "Reverse L/R", "Reverse UP/DOWN",
            "Calibrate Motor", "Quiet Slew", "Max Elevation", "Min AOS",
            "Anti-Backlash",
        ])),
        ("Targets", MenuNode::Leaf(&["Astronomical", "Terrestrial"])),
        ("Site", MenuNode::Leaf(&["Select", "Add", "Delete", "Edit"])),
        ("Owner Info", MenuNode::Leaf(&[])),
        ("Download", MenuNode::Leaf(&[])),
        ("Statistics", MenuNode::Leaf(&[])),
        ("Reset", MenuNode::Leaf(&[])),
    ])),
]);

// mod tests.
