// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod decode;
mod frames;
mod raw;

pub use decode::DecodeCmd;
pub use frames::FramesCmd;
pub use raw::RawCmd;
