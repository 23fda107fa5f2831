// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

pub mod command_dispatcher;
pub mod command_framer;
pub mod lx200_server;
pub mod lx200_session;
pub mod menu_navigator;
pub mod response_buffer;
pub mod telescope_state;
