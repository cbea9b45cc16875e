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

use crate::common::HarvestSystemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One job of a harvest system: the role that performs it and the jobs
/// whose output it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemJob {
    pub name: String,
    pub machine_role: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl SystemJob {
    pub fn new<I, S>(name: impl Into<String>, machine_role: impl Into<String>, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            machine_role: machine_role.into(),
            prerequisites: prerequisites.into_iter().map(Into::into).collect(),
        }
    }
}

/// A job graph sequencing the roles that work a block, e.g.
/// felling, then skidding, then processing, then loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestSystem {
    id: HarvestSystemId,
    jobs: Vec<SystemJob>,
    #[serde(default)]
    role_headstart_shifts: BTreeMap<String, u32>,
    #[serde(default)]
    loader_batch_volume: Option<f64>,
}

impl HarvestSystem {
    pub fn new<I>(id: impl Into<HarvestSystemId>, jobs: I) -> Self
    where
        I: IntoIterator<Item = SystemJob>,
    {
        Self {
            id: id.into(),
            jobs: jobs.into_iter().collect(),
            role_headstart_shifts: BTreeMap::new(),
            loader_batch_volume: None,
        }
    }

    #[inline]
    pub fn with_headstart(mut self, role: impl Into<String>, shifts: u32) -> Self {
        self.role_headstart_shifts.insert(role.into(), shifts);
        self
    }

    #[inline]
    pub fn with_loader_batch_volume(mut self, volume: f64) -> Self {
        self.loader_batch_volume = Some(volume);
        self
    }

    #[inline]
    pub fn id(&self) -> &HarvestSystemId {
        &self.id
    }

    #[inline]
    pub fn jobs(&self) -> &[SystemJob] {
        &self.jobs
    }

    #[inline]
    pub fn role_headstart_shifts(&self) -> &BTreeMap<String, u32> {
        &self.role_headstart_shifts
    }

    #[inline]
    pub fn headstart_for(&self, role: &str) -> u32 {
        self.role_headstart_shifts.get(role).copied().unwrap_or(0)
    }

    #[inline]
    pub fn loader_batch_volume(&self) -> Option<f64> {
        self.loader_batch_volume
    }

    /// Roles performing at least one job, in job order without repeats.
    pub fn roles(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            if !out.contains(&job.machine_role.as_str()) {
                out.push(job.machine_role.as_str());
            }
        }
        out
    }

    /// Roles whose jobs feed any job performed by `role`. A role never
    /// lists itself.
    pub fn prerequisite_roles(&self, role: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for job in self.jobs.iter().filter(|j| j.machine_role == role) {
            for pre in &job.prerequisites {
                if let Some(src) = self.jobs.iter().find(|j| &j.name == pre)
                    && src.machine_role != role
                    && !out.contains(&src.machine_role.as_str())
                {
                    out.push(src.machine_role.as_str());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground_based() -> HarvestSystem {
        HarvestSystem::new(
            "ground",
            [
                SystemJob::new("felling", "feller", Vec::<String>::new()),
                SystemJob::new("skidding", "skidder", ["felling"]),
                SystemJob::new("processing", "processor", ["skidding"]),
                SystemJob::new("loading", "loader", ["processing", "skidding"]),
            ],
        )
    }

    #[test]
    fn test_roles_in_job_order() {
        let sys = ground_based();
        assert_eq!(sys.roles(), vec!["feller", "skidder", "processor", "loader"]);
    }

    #[test]
    fn test_prerequisite_roles() {
        let sys = ground_based();
        assert!(sys.prerequisite_roles("feller").is_empty());
        assert_eq!(sys.prerequisite_roles("skidder"), vec!["feller"]);
        assert_eq!(sys.prerequisite_roles("loader"), vec!["processor", "skidder"]);
    }

    #[test]
    fn test_headstart_defaults_to_zero() {
        let sys = ground_based().with_headstart("skidder", 2);
        assert_eq!(sys.headstart_for("skidder"), 2);
        assert_eq!(sys.headstart_for("loader"), 0);
    }
}
