// Copyright (c) The Gantry Authors. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// The recognized workload kinds a patch can address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadType {
    Deployment,
    StatefulSet,
    DaemonSet,
    CronJob,
}

impl WorkloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::Deployment => "deployment",
            WorkloadType::StatefulSet => "statefulset",
            WorkloadType::DaemonSet => "daemonset",
            WorkloadType::CronJob => "cronjob",
        }
    }
}

impl FromStr for WorkloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deployment" | "deploy" => Ok(WorkloadType::Deployment),
            "statefulset" | "sts" => Ok(WorkloadType::StatefulSet),
            "daemonset" | "ds" => Ok(WorkloadType::DaemonSet),
            "cronjob" => Ok(WorkloadType::CronJob),
            _ => Err(Error::UnknownWorkloadType(s.to_string())),
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The address of one container within one cluster/namespace/workload
/// instance, parsed from `CLUSTER/NAMESPACE/TYPE/NAME[/CONTAINER]`. A
/// trailing `!` on the last segment marks the container as an init container.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTarget {
    pub cluster: String,
    pub namespace: String,
    pub kind: WorkloadType,
    pub name: String,
    pub container: String,
    pub init: bool,
}

/// Segments are lower-cased and trimmed, with `.` and `_` collapsed to `-`,
/// so descriptors survive copy-paste from job names and hostnames.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['.', '_'], "-")
}

impl FromStr for WorkloadTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut segments: Vec<&str> = s.split('/').collect();
        if segments.len() != 4 && segments.len() != 5 {
            return Err(Error::InvalidWorkloadTarget(s.to_string()));
        }

        let mut init = false;
        let last = segments.len() - 1;
        if let Some(stripped) = segments[last].strip_suffix('!') {
            init = true;
            segments[last] = stripped;
        }

        let kind: WorkloadType = normalize(segments[2]).parse()?;
        let name = normalize(segments[3]);
        let container = match segments.get(4) {
            Some(segment) => normalize(segment),
            // Container name mirrors the workload name by convention.
            None => name.clone(),
        };

        Ok(WorkloadTarget {
            cluster: normalize(segments[0]),
            namespace: normalize(segments[1]),
            kind,
            name,
            container,
            init,
        })
    }
}

impl fmt::Display for WorkloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}{}",
            self.cluster,
            self.namespace,
            self.kind,
            self.name,
            self.container,
            if self.init { "!" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_segments() {
        let target: WorkloadTarget = "Test-Cluster/Test.NS/deployment/Whoa".parse().unwrap();

        assert_eq!(target.cluster, "test-cluster");
        assert_eq!(target.namespace, "test-ns");
        assert_eq!(target.kind, WorkloadType::Deployment);
        assert_eq!(target.name, "whoa");
        assert_eq!(target.container, "whoa");
        assert!(!target.init);
    }

    #[test]
    fn test_parse_explicit_container() {
        let target: WorkloadTarget = "c/n/sts/web/sidecar_1".parse().unwrap();

        assert_eq!(target.kind, WorkloadType::StatefulSet);
        assert_eq!(target.name, "web");
        assert_eq!(target.container, "sidecar-1");
    }

    #[test]
    fn test_parse_init_marker() {
        let target: WorkloadTarget = "c/n/deployment/w/w2!".parse().unwrap();
        assert_eq!(target.container, "w2");
        assert!(target.init);

        // the marker also applies when the container segment is omitted
        let target: WorkloadTarget = "c/n/deployment/migrate!".parse().unwrap();
        assert_eq!(target.name, "migrate");
        assert_eq!(target.container, "migrate");
        assert!(target.init);
    }

    #[test]
    fn test_parse_rejects_bad_segment_count() {
        for s in ["", "c/n", "c/n/deployment", "c/n/deployment/w/x/y"] {
            assert!(s.parse::<WorkloadTarget>().is_err(), "expected {:?} to be rejected", s);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = "c/n/bogus/w".parse::<WorkloadTarget>().unwrap_err();
        assert!(matches!(err, Error::UnknownWorkloadType(_)));
    }

    #[test]
    fn test_display_round_trip() {
        let target: WorkloadTarget = "c/n/deploy/w/w2!".parse().unwrap();
        assert_eq!(target.to_string(), "c/n/deployment/w/w2!");
        assert_eq!(target.to_string().parse::<WorkloadTarget>().unwrap(), target);
    }
}
