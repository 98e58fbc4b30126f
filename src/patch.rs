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

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, LocalObjectReference, ResourceRequirements};
use k8s_openapi::chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::manifest::Profile;
use crate::preset::Preset;
use crate::workload::WorkloadTarget;

/// Pod-template annotation stamped on every patch. A fresh value forces the
/// orchestrator to treat the template as changed, so a rollout happens even
/// when the image tag is identical to the previous one.
pub const TIMESTAMP_ANNOTATION: &str = "gantry.app/timestamp";

#[derive(Clone, Debug, Default, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// The pod-spec subset a patch may set. Everything else on the target pod
/// spec is deliberately left alone.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpecPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<LocalObjectReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<Container>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PodTemplatePatch {
    pub metadata: Metadata,
    pub spec: PodSpecPatch,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct WorkloadSpecPatch {
    pub template: PodTemplatePatch,
}

/// A sparse overlay over one workload object: annotations, pull secrets and
/// exactly one (init) container entry. Submitted by the apply collaborator as
/// a partial/merge update, never as a full object replacement.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WorkloadPatch {
    pub metadata: Metadata,
    pub spec: WorkloadSpecPatch,
}

/// Combine the cluster preset, the resolved profile, the workload target and
/// the final image reference into one patch document.
pub fn assemble(preset: &Preset, profile: &Profile, target: &WorkloadTarget, image: &str) -> WorkloadPatch {
    assemble_at(preset, profile, target, image, Utc::now())
}

/// Same as [`assemble`], with the rollout timestamp injected. Assembly is
/// deterministic for a frozen timestamp.
pub fn assemble_at(
    preset: &Preset,
    profile: &Profile,
    target: &WorkloadTarget,
    image: &str,
    now: DateTime<Utc>,
) -> WorkloadPatch {
    let mut patch = WorkloadPatch::default();

    if !preset.annotations.is_empty() {
        patch.metadata.annotations = Some(preset.annotations.clone());
    }
    patch.spec.template.metadata.annotations = Some(BTreeMap::from([(
        TIMESTAMP_ANNOTATION.into(),
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
    )]));

    if !preset.image_pull_secrets.is_empty() {
        patch.spec.template.spec.image_pull_secrets = Some(
            preset
                .image_pull_secrets
                .iter()
                .map(|name| LocalObjectReference { name: Some(name.trim().to_string()) })
                .collect(),
        );
    }

    let mut container = Container {
        name: target.container.clone(),
        image: Some(image.to_string()),
        image_pull_policy: Some("Always".into()),
        ..Default::default()
    };

    if target.init {
        // Init containers run to completion; they get no quotas and no probes.
        patch.spec.template.spec.init_containers = Some(vec![container]);
        return patch;
    }

    // Per-axis precedence: the profile overrides the preset independently for
    // CPU and memory.
    let cpu = profile.resource.cpu.or(preset.resource.cpu);
    let mem = profile.resource.mem.or(preset.resource.mem);

    let mut requests = BTreeMap::new();
    let mut limits = BTreeMap::new();
    if let Some(cpu) = cpu {
        let (request, limit) = cpu.as_cpu();
        requests.insert("cpu".to_string(), request);
        limits.insert("cpu".to_string(), limit);
    }
    if let Some(mem) = mem {
        let (request, limit) = mem.as_memory();
        requests.insert("memory".to_string(), request);
        limits.insert("memory".to_string(), limit);
    }
    if !requests.is_empty() {
        container.resources = Some(ResourceRequirements {
            requests: Some(requests),
            limits: Some(limits),
            ..Default::default()
        });
    }

    container.readiness_probe = profile.check.readiness_probe();
    container.liveness_probe = profile.check.liveness_probe();

    patch.spec.template.spec.containers = Some(vec![container]);
    patch
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    use super::*;
    use crate::check::HealthCheck;
    use crate::manifest::ResourceSet;

    fn preset() -> Preset {
        Preset {
            registry: "registry.example.com".into(),
            annotations: BTreeMap::from([("owner".to_string(), "platform".to_string())]),
            image_pull_secrets: vec![" pull-secret ".into()],
            resource: ResourceSet { cpu: Some("100:200".parse().unwrap()), mem: None },
            ..Default::default()
        }
    }

    fn target(s: &str) -> WorkloadTarget {
        s.parse().unwrap()
    }

    #[test]
    fn test_assemble_regular_container() {
        let profile = Profile {
            name: "prod".into(),
            resource: ResourceSet { cpu: None, mem: Some("256:-".parse().unwrap()) },
            check: HealthCheck { path: Some("/healthz".into()), ..Default::default() },
            ..Default::default()
        };

        let patch = assemble(&preset(), &profile, &target("c/n/deployment/web"), "r/web:prod");

        assert_eq!(
            patch.metadata.annotations,
            Some(BTreeMap::from([("owner".to_string(), "platform".to_string())]))
        );
        let secrets = patch.spec.template.spec.image_pull_secrets.unwrap();
        assert_eq!(secrets[0].name, Some("pull-secret".into()));

        let containers = patch.spec.template.spec.containers.unwrap();
        assert_eq!(containers.len(), 1);
        let container = &containers[0];
        assert_eq!(container.name, "web");
        assert_eq!(container.image, Some("r/web:prod".into()));
        assert_eq!(container.image_pull_policy, Some("Always".into()));
        assert!(container.readiness_probe.is_some());
        assert_eq!(container.liveness_probe.as_ref().unwrap().success_threshold, Some(1));

        // preset CPU survives, profile memory wins, unbounded limit becomes
        // the fixed ceiling
        let resources = container.resources.as_ref().unwrap();
        let requests = resources.requests.as_ref().unwrap();
        let limits = resources.limits.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity("100m".into()));
        assert_eq!(limits["cpu"], Quantity("200m".into()));
        assert_eq!(requests["memory"], Quantity("256Mi".into()));
        assert_eq!(limits["memory"], Quantity("999Gi".into()));
    }

    #[test]
    fn test_assemble_init_container() {
        let profile = Profile {
            name: "prod".into(),
            check: HealthCheck { path: Some("/healthz".into()), ..Default::default() },
            ..Default::default()
        };

        let patch = assemble(&preset(), &profile, &target("c/n/deployment/web/migrate!"), "r/web:prod");

        assert!(patch.spec.template.spec.containers.is_none());
        let init = patch.spec.template.spec.init_containers.unwrap();
        assert_eq!(init.len(), 1);
        assert_eq!(init[0].name, "migrate");
        assert_eq!(init[0].image_pull_policy, Some("Always".into()));
        assert!(init[0].resources.is_none());
        assert!(init[0].readiness_probe.is_none());
        assert!(init[0].liveness_probe.is_none());
    }

    #[test]
    fn test_assemble_no_check_no_probes() {
        let profile = Profile { name: "prod".into(), ..Default::default() };
        let patch = assemble(&preset(), &profile, &target("c/n/deployment/web"), "r/web:prod");

        let containers = patch.spec.template.spec.containers.unwrap();
        assert!(containers[0].readiness_probe.is_none());
        assert!(containers[0].liveness_probe.is_none());
    }

    #[test]
    fn test_assemble_stamps_rollout_timestamp() {
        let profile = Profile { name: "prod".into(), ..Default::default() };
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc);

        let patch = assemble_at(&preset(), &profile, &target("c/n/deployment/web"), "r/web:prod", now);

        let annotations = patch.spec.template.metadata.annotations.unwrap();
        assert_eq!(annotations[TIMESTAMP_ANNOTATION], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_patch_serializes_sparse() {
        let profile = Profile { name: "prod".into(), ..Default::default() };
        let mut preset = preset();
        preset.annotations.clear();
        preset.image_pull_secrets.clear();

        let patch = assemble(&preset, &profile, &target("c/n/deployment/web/migrate!"), "r/web:prod");
        let value = serde_json::to_value(&patch).unwrap();

        // only the fields this run intends to set appear in the document
        assert_eq!(value["metadata"].get("annotations"), None);
        let spec = &value["spec"]["template"]["spec"];
        assert_eq!(spec.get("containers"), None);
        assert_eq!(spec.get("imagePullSecrets"), None);
        assert!(spec["initContainers"][0]["resources"].is_null());
        assert_eq!(spec["initContainers"][0]["image"], "r/web:prod");
    }
}
