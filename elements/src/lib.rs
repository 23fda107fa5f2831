// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

pub mod menu_model;
pub mod sexagesimal;
