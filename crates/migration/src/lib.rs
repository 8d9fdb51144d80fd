// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod distribution;
mod record;
mod sources;
mod stats;

pub use distribution::*;
pub use record::*;
pub use sources::*;
pub use stats::*;
