// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod ledger;
mod reconstruct;
mod strategy;
mod window;

pub use ledger::*;
pub use reconstruct::*;
pub use strategy::*;
pub use window::*;
