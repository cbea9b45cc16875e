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

use crate::scenario::{err::ScenarioLoaderError, scen::Scenario};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// Reads scenarios from JSON and validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScenarioLoader {
    skip_validation: bool,
}

impl ScenarioLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn skip_validation(mut self, yes: bool) -> Self {
        self.skip_validation = yes;
        self
    }

    pub fn from_reader<R: Read>(&self, r: R) -> Result<Scenario, ScenarioLoaderError> {
        let scenario: Scenario = serde_json::from_reader(BufReader::new(r))?;
        if !self.skip_validation {
            scenario.validate()?;
        }
        Ok(scenario)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Scenario, ScenarioLoaderError> {
        let file = File::open(path).map_err(ScenarioLoaderError::Io)?;
        self.from_reader(file)
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Scenario, ScenarioLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::err::ScenarioError;

    const TINY: &str = r#"{
        "name": "tiny",
        "num_days": 2,
        "machines": [{"id": "M1", "role": "harvester"}],
        "blocks": [{"id": "B1", "landing_id": "L1", "work_required": 10.0,
                    "earliest_start": 1, "latest_finish": 2}],
        "landings": [{"id": "L1", "daily_capacity": 1}],
        "production_rates": [{"machine_id": "M1", "block_id": "B1", "rate": 5.0}],
        "calendar": [{"machine_id": "M1", "day": 2, "available": false}],
        "timeline": {"shift_ids": ["AM", "PM"]}
    }"#;

    #[test]
    fn test_loads_minimal_json() {
        let s = ScenarioLoader::new().from_str(TINY).unwrap();
        assert_eq!(s.name(), "tiny");
        assert_eq!(s.machines()[0].daily_hours(), 24.0);
        assert_eq!(s.objective_weights().production, 1.0);
        assert!(s.mobilisation().is_none());
        assert_eq!(s.timeline().effective_shift_ids().len(), 2);
        assert!(!s.calendar()[0].available);
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = ScenarioLoader::new().from_str("{ not json").unwrap_err();
        assert!(matches!(err, ScenarioLoaderError::Json(_)));
    }

    #[test]
    fn test_invalid_scenario_is_reported() {
        let bad = TINY.replace("\"latest_finish\": 2", "\"latest_finish\": 5");
        let err = ScenarioLoader::new().from_str(&bad).unwrap_err();
        assert!(matches!(
            err,
            ScenarioLoaderError::Scenario(ScenarioError::InvalidWindow(_))
        ));
        assert!(
            ScenarioLoader::new()
                .skip_validation(true)
                .from_str(&bad)
                .is_ok()
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ScenarioLoader::new()
            .from_path("/definitely/not/here.json")
            .unwrap_err();
        assert!(matches!(err, ScenarioLoaderError::Io(_)));
    }
}
