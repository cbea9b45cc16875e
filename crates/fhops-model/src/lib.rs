// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod common;
pub mod problem;
pub mod scenario;

pub mod prelude {
    pub use crate::common::{
        BlockId, Day, HarvestSystemId, Identifier, IdentifierMarkerName, LandingId, MachineId,
    };
    pub use crate::problem::{Problem, ShiftSlot};
    pub use crate::scenario::block::{Block, Landing, ProductionRate};
    pub use crate::scenario::builder::ScenarioBuilder;
    pub use crate::scenario::constraints::{
        BlackoutWindow, DEFAULT_SHIFT_ID, ScheduleLock, Timeline,
    };
    pub use crate::scenario::err::{
        DayOutOfRangeError, DuplicateIdError, EmptyHorizonError, InvalidQuantityError,
        InvalidWindowError, ScenarioError, ScenarioLoaderError, UnknownPrerequisiteError,
        UnknownReferenceError,
    };
    pub use crate::scenario::loader::ScenarioLoader;
    pub use crate::scenario::machine::{CalendarEntry, Machine, ShiftCalendarEntry};
    pub use crate::scenario::mobilisation::{BlockDistance, MachineMobilisation, MobilisationConfig};
    pub use crate::scenario::objective::ObjectiveWeights;
    pub use crate::scenario::scen::Scenario;
    pub use crate::scenario::system::{HarvestSystem, SystemJob};
}
