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

use std::path::PathBuf;

use gantry::errors::{Error, Result};
use gantry::quota::Quota;
use gantry::workload::WorkloadTarget;

/// The configuration parameters for one run.
///
/// These can either be passed on the command line, or pulled from the CI
/// environment: when `--image` or `--profile` is omitted, both are inferred
/// from the job name (`image.profile`), which is how Jenkins-style pipelines
/// address their environments.
#[derive(clap::Parser, Debug)]
pub struct Config {
    /// The build/deploy descriptor to load
    #[clap(long, default_value = "gantry.yml")]
    pub manifest: PathBuf,

    /// Image name; inferred from the CI job name when omitted
    #[clap(long)]
    pub image: Option<String>,

    /// Profile (environment) name; inferred from the CI job name when omitted
    #[clap(long)]
    pub profile: Option<String>,

    /// Target workload, "CLUSTER/NAMESPACE/TYPE/NAME[/CONTAINER]"; may be
    /// repeated, targets are processed in order
    #[clap(long = "workload")]
    pub workloads: Vec<WorkloadTarget>,

    /// CPU quota override, "REQUEST:LIMIT" in millicores; replaces the
    /// profile's value wholesale
    #[clap(long)]
    pub cpu: Option<Quota>,

    /// Memory quota override, "REQUEST:LIMIT" in mebibytes; replaces the
    /// profile's value wholesale
    #[clap(long)]
    pub mem: Option<Quota>,

    /// Directory holding per-cluster preset-<CLUSTER>.yml files,
    /// default ~/.gantry
    #[clap(long, env = "GANTRY_PRESETS_DIR")]
    pub presets_dir: Option<PathBuf>,

    /// Directory the rendered scripts and patch documents are written to
    #[clap(long, env = "GANTRY_OUTPUT", default_value = "gantry-out")]
    pub output: PathBuf,
}

fn env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Config {
    /// The effective image and profile names, falling back to the CI job
    /// name (`$CCI_JOB_NAME`, then `$JOB_NAME`) split on `.`.
    pub fn job(&self) -> Result<(String, String)> {
        if let (Some(image), Some(profile)) = (&self.image, &self.profile) {
            return Ok((image.clone(), profile.clone()));
        }

        let job_name = env_var(&["CCI_JOB_NAME", "JOB_NAME"])
            .ok_or(Error::MissingEnvironment("JOB_NAME"))?;
        let (image, profile) = job_name
            .split_once('.')
            .filter(|(image, profile)| !image.is_empty() && !profile.is_empty())
            .ok_or(Error::MissingEnvironment("JOB_NAME"))?;

        Ok((
            self.image.clone().unwrap_or_else(|| image.to_string()),
            self.profile.clone().unwrap_or_else(|| profile.to_string()),
        ))
    }

    /// The build number used for the per-build image tag, taken from the
    /// first non-empty CI variable.
    pub fn build_number(&self) -> Option<String> {
        env_var(&["GIT_COMMIT_SHORT", "CI_BUILD_NUMBER", "BUILD_NUMBER"])
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_explicit_image_and_profile() {
        let config = Config::parse_from(["gantry", "--image", "web", "--profile", "prod"]);
        assert_eq!(config.job().unwrap(), ("web".to_string(), "prod".to_string()));
    }

    #[test]
    fn test_workloads_accumulate_in_order() {
        let config = Config::parse_from([
            "gantry",
            "--workload",
            "c/n/deployment/a",
            "--workload",
            "c/n/deployment/a",
            "--workload",
            "c/n/sts/b",
        ]);

        // repeats are kept, order preserved
        assert_eq!(config.workloads.len(), 3);
        assert_eq!(config.workloads[0], config.workloads[1]);
        assert_eq!(config.workloads[2].name, "b");
    }

    #[test]
    fn test_quota_override_parses() {
        let config = Config::parse_from(["gantry", "--cpu", "100:200", "--mem", "256:-"]);
        assert_eq!(config.cpu, Some("100:200".parse().unwrap()));
        assert_eq!(config.mem, Some("256:-".parse().unwrap()));
    }

    #[test]
    fn test_bad_workload_is_rejected() {
        let result = Config::try_parse_from(["gantry", "--workload", "c/n/bogus/w"]);
        assert!(result.is_err());
    }
}
