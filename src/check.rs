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

use k8s_openapi::api::core::v1::{HTTPGetAction, Probe};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

const DEFAULT_PORT: i32 = 8080;
const DEFAULT_DELAY: i32 = 60;
const DEFAULT_INTERVAL: i32 = 15;
const DEFAULT_SUCCESS: i32 = 1;
const DEFAULT_FAILURE: i32 = 2;
const DEFAULT_TIMEOUT: i32 = 5;

/// HTTP health check parameters for one container. Absent numeric fields fall
/// back to fixed defaults; `path` is the on/off switch and is never defaulted,
/// so a check without a path produces no probes at all.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    pub port: Option<i32>,
    pub path: Option<String>,
    pub delay: Option<i32>,
    pub interval: Option<i32>,
    pub success: Option<i32>,
    pub failure: Option<i32>,
    pub timeout: Option<i32>,
}

impl HealthCheck {
    /// Fill absent numeric fields with the fixed defaults, leaving `path`
    /// untouched.
    pub fn with_defaults(&self) -> HealthCheck {
        HealthCheck {
            port: self.port.or(Some(DEFAULT_PORT)),
            path: self.path.clone(),
            delay: self.delay.or(Some(DEFAULT_DELAY)),
            interval: self.interval.or(Some(DEFAULT_INTERVAL)),
            success: self.success.or(Some(DEFAULT_SUCCESS)),
            failure: self.failure.or(Some(DEFAULT_FAILURE)),
            timeout: self.timeout.or(Some(DEFAULT_TIMEOUT)),
        }
    }

    /// Field-wise merge, taking the fallback's value for every absent field.
    pub fn merge(&self, fallback: &HealthCheck) -> HealthCheck {
        HealthCheck {
            port: self.port.or(fallback.port),
            path: self.path.clone().or_else(|| fallback.path.clone()),
            delay: self.delay.or(fallback.delay),
            interval: self.interval.or(fallback.interval),
            success: self.success.or(fallback.success),
            failure: self.failure.or(fallback.failure),
            timeout: self.timeout.or(fallback.timeout),
        }
    }

    pub fn readiness_probe(&self) -> Option<Probe> {
        let check = self.with_defaults();
        let path = check.path.as_deref().unwrap_or_default();
        if path.is_empty() {
            return None;
        }

        Some(Probe {
            initial_delay_seconds: check.delay,
            timeout_seconds: check.timeout,
            period_seconds: check.interval,
            success_threshold: check.success,
            failure_threshold: check.failure,
            http_get: Some(HTTPGetAction {
                path: Some(path.to_string()),
                port: IntOrString::Int(check.port.unwrap_or(DEFAULT_PORT)),
                scheme: Some("HTTP".into()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Same as the readiness probe, except liveness semantics require a
    /// single success to transition healthy.
    pub fn liveness_probe(&self) -> Option<Probe> {
        let mut probe = self.readiness_probe()?;
        probe.success_threshold = Some(1);
        Some(probe)
    }
}
