// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod logs;
mod mock_gateway;
mod utils;

pub use logs::*;
pub use mock_gateway::*;
pub use utils::*;
