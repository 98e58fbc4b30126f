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

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::HealthCheck;
use crate::errors::{Error, Result};
use crate::quota::Quota;

/// The manifest schema version this engine understands.
pub const MANIFEST_VERSION: u32 = 2;

/// CPU/memory quota overrides. Either axis may be left unset, meaning no
/// override at this level.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSet {
    pub cpu: Option<Quota>,
    pub mem: Option<Quota>,
}

/// Container image used to run the build script, with optional host-side
/// cache directories keyed by cache group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Builder {
    pub image: Option<String>,
    pub cache_group: Option<String>,
    pub caches: Option<Vec<String>>,
}

impl Builder {
    fn merge(&self, fallback: &Builder) -> Builder {
        Builder {
            image: self.image.clone().or_else(|| fallback.image.clone()),
            cache_group: self.cache_group.clone().or_else(|| fallback.cache_group.clone()),
            caches: self.caches.clone().or_else(|| fallback.caches.clone()),
        }
    }
}

/// One environment's build/package/resource/check settings. A resolved
/// profile is a named profile with the manifest's default merged underneath.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip)]
    pub name: String,
    pub resource: ResourceSet,
    pub check: HealthCheck,
    pub build: Option<Vec<String>>,
    pub builder: Builder,
    pub package: Option<Vec<String>>,
    pub vars: Option<HashMap<String, serde_json::Value>>,
}

impl Profile {
    /// Merge `fallback` (the manifest default) underneath this profile.
    /// Scalar fields inherit when absent; the build/package/vars collections
    /// are replaced wholesale only when entirely absent, never unioned
    /// element-wise.
    fn merge(mut self, fallback: &Profile) -> Profile {
        self.resource.cpu = self.resource.cpu.or(fallback.resource.cpu);
        self.resource.mem = self.resource.mem.or(fallback.resource.mem);
        self.check = self.check.merge(&fallback.check);
        self.builder = self.builder.merge(&fallback.builder);
        if self.build.is_none() {
            self.build = fallback.build.clone();
        }
        if self.package.is_none() {
            self.package = fallback.package.clone();
        }
        if self.vars.is_none() {
            self.vars = fallback.vars.clone();
        }
        self
    }
}

/// The declarative build/deploy descriptor: a shared default profile plus a
/// mapping of named environment profiles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    #[serde(default)]
    pub default: Profile,
    #[serde(flatten)]
    pub profiles: HashMap<String, Profile>,
}

impl Manifest {
    pub fn load(content: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_yaml::from_str(content).map_err(Error::YamlParseFailed)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Manifest> {
        let content = std::fs::read_to_string(path).map_err(Error::IoError)?;
        Manifest::load(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            return Err(Error::UnsupportedManifestVersion {
                expected: MANIFEST_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }

    /// Produce the effective profile for `name`. A name absent from the map
    /// yields a profile inheriting everything from the default, which lets
    /// an environment exist in the manifest implicitly.
    pub fn resolve(&self, name: &str) -> Result<Profile> {
        self.validate()?;

        let mut profile = self.profiles.get(name).cloned().unwrap_or_default();
        profile.name = name.to_string();
        debug!("resolving profile {} against the manifest default", name);

        Ok(profile.merge(&self.default))
    }
}
