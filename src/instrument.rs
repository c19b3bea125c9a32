// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use serde::{Deserialize, Serialize};

/// The instruments that can be played.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    #[default]
    Piano,
    Violin,
    Harp,
}

impl InstrumentKind {
    /// All instruments, in the order they are offered to the user.
    pub const ALL: [InstrumentKind; 3] = [
        InstrumentKind::Piano,
        InstrumentKind::Violin,
        InstrumentKind::Harp,
    ];

    /// The short identifier used in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Piano => "piano",
            InstrumentKind::Violin => "violin",
            InstrumentKind::Harp => "harp",
        }
    }

    /// The name shown in the instrument picker.
    pub fn display_name(self) -> &'static str {
        match self {
            InstrumentKind::Piano => "Neon Piano",
            InstrumentKind::Violin => "Plasma Violin",
            InstrumentKind::Harp => "Photon Harp",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
