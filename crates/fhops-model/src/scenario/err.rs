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

use crate::common::{BlockId, Day, HarvestSystemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyHorizonError;

impl std::fmt::Display for EmptyHorizonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The planning horizon must contain at least one day.")
    }
}

impl std::error::Error for EmptyHorizonError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateIdError {
    kind: &'static str,
    id: String,
}

impl DuplicateIdError {
    pub fn new(kind: &'static str, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duplicate {} id '{}'", self.kind, self.id)
    }
}

impl std::error::Error for DuplicateIdError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownReferenceError {
    kind: &'static str,
    id: String,
    referenced_by: String,
}

impl UnknownReferenceError {
    pub fn new(kind: &'static str, id: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn referenced_by(&self) -> &str {
        &self.referenced_by
    }
}

impl std::fmt::Display for UnknownReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown {} '{}' referenced by {}",
            self.kind, self.id, self.referenced_by
        )
    }
}

impl std::error::Error for UnknownReferenceError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidWindowError {
    block: BlockId,
    earliest_start: Day,
    latest_finish: Day,
    num_days: Day,
}

impl InvalidWindowError {
    pub fn new(block: BlockId, earliest_start: Day, latest_finish: Day, num_days: Day) -> Self {
        Self {
            block,
            earliest_start,
            latest_finish,
            num_days,
        }
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn earliest_start(&self) -> Day {
        self.earliest_start
    }

    pub fn latest_finish(&self) -> Day {
        self.latest_finish
    }

    pub fn num_days(&self) -> Day {
        self.num_days
    }
}

impl std::fmt::Display for InvalidWindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {} has window [{}, {}] which does not fit the horizon 1..={}",
            self.block, self.earliest_start, self.latest_finish, self.num_days
        )
    }
}

impl std::error::Error for InvalidWindowError {}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidQuantityError {
    what: String,
    value: f64,
}

impl InvalidQuantityError {
    pub fn new(what: impl Into<String>, value: f64) -> Self {
        Self {
            what: what.into(),
            value,
        }
    }

    pub fn what(&self) -> &str {
        &self.what
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for InvalidQuantityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} must be finite and non-negative, got {}",
            self.what, self.value
        )
    }
}

impl std::error::Error for InvalidQuantityError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayOutOfRangeError {
    context: String,
    day: Day,
    num_days: Day,
}

impl DayOutOfRangeError {
    pub fn new(context: impl Into<String>, day: Day, num_days: Day) -> Self {
        Self {
            context: context.into(),
            day,
            num_days,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn num_days(&self) -> Day {
        self.num_days
    }
}

impl std::fmt::Display for DayOutOfRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Day {} in {} is outside the horizon 1..={}",
            self.day, self.context, self.num_days
        )
    }
}

impl std::error::Error for DayOutOfRangeError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownPrerequisiteError {
    system: HarvestSystemId,
    job: String,
    prerequisite: String,
}

impl UnknownPrerequisiteError {
    pub fn new(system: HarvestSystemId, job: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        Self {
            system,
            job: job.into(),
            prerequisite: prerequisite.into(),
        }
    }

    pub fn system(&self) -> &HarvestSystemId {
        &self.system
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn prerequisite(&self) -> &str {
        &self.prerequisite
    }
}

impl std::fmt::Display for UnknownPrerequisiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' of {} lists unknown prerequisite '{}'",
            self.job, self.system, self.prerequisite
        )
    }
}

impl std::error::Error for UnknownPrerequisiteError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    EmptyHorizon(EmptyHorizonError),
    DuplicateId(DuplicateIdError),
    UnknownReference(UnknownReferenceError),
    InvalidWindow(InvalidWindowError),
    InvalidQuantity(InvalidQuantityError),
    DayOutOfRange(DayOutOfRangeError),
    UnknownPrerequisite(UnknownPrerequisiteError),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::EmptyHorizon(e) => write!(f, "{}", e),
            ScenarioError::DuplicateId(e) => write!(f, "{}", e),
            ScenarioError::UnknownReference(e) => write!(f, "{}", e),
            ScenarioError::InvalidWindow(e) => write!(f, "{}", e),
            ScenarioError::InvalidQuantity(e) => write!(f, "{}", e),
            ScenarioError::DayOutOfRange(e) => write!(f, "{}", e),
            ScenarioError::UnknownPrerequisite(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<EmptyHorizonError> for ScenarioError {
    fn from(err: EmptyHorizonError) -> Self {
        ScenarioError::EmptyHorizon(err)
    }
}

impl From<DuplicateIdError> for ScenarioError {
    fn from(err: DuplicateIdError) -> Self {
        ScenarioError::DuplicateId(err)
    }
}

impl From<UnknownReferenceError> for ScenarioError {
    fn from(err: UnknownReferenceError) -> Self {
        ScenarioError::UnknownReference(err)
    }
}

impl From<InvalidWindowError> for ScenarioError {
    fn from(err: InvalidWindowError) -> Self {
        ScenarioError::InvalidWindow(err)
    }
}

impl From<InvalidQuantityError> for ScenarioError {
    fn from(err: InvalidQuantityError) -> Self {
        ScenarioError::InvalidQuantity(err)
    }
}

impl From<DayOutOfRangeError> for ScenarioError {
    fn from(err: DayOutOfRangeError) -> Self {
        ScenarioError::DayOutOfRange(err)
    }
}

impl From<UnknownPrerequisiteError> for ScenarioError {
    fn from(err: UnknownPrerequisiteError) -> Self {
        ScenarioError::UnknownPrerequisite(err)
    }
}

#[derive(Debug)]
pub enum ScenarioLoaderError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Scenario(ScenarioError),
}

impl From<std::io::Error> for ScenarioLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioLoaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ScenarioError> for ScenarioLoaderError {
    fn from(e: ScenarioError) -> Self {
        Self::Scenario(e)
    }
}

impl std::fmt::Display for ScenarioLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ScenarioLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Json(e) => write!(f, "JSON error: {e}"),
            Scenario(e) => write!(f, "scenario error: {e}"),
        }
    }
}

impl std::error::Error for ScenarioLoaderError {}
