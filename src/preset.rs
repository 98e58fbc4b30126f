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

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{Error, Result};
use crate::manifest::ResourceSet;

/// AuthConfig contains authorization information for connecting to a Registry.
/// Inlined what we use from the Docker CLI's config types.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub auth: Option<String>,
}

/// DockerConfig mirrors the `~/.docker/config.json` file shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    pub auths: Option<HashMap<String, AuthConfig>>,
}

/// Cluster-level configuration: registry address, baseline annotations and
/// resources, and the opaque credential blobs the external collaborators
/// persist and pass to docker/kubectl. Loaded once per target cluster and
/// never merged with a profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preset {
    pub registry: String,
    pub annotations: BTreeMap<String, String>,
    pub image_pull_secrets: Vec<String>,
    pub resource: ResourceSet,
    pub kubeconfig: Option<serde_yaml::Value>,
    pub dockerconfig: DockerConfig,
}

impl Preset {
    pub fn load(content: &str) -> Result<Preset> {
        serde_yaml::from_str(content).map_err(Error::YamlParseFailed)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Preset> {
        let content = std::fs::read_to_string(path).map_err(Error::IoError)?;
        Preset::load(&content)
    }

    /// Load `preset-<cluster>.yml` from the presets directory.
    pub fn load_for_cluster(dir: impl AsRef<Path>, cluster: &str) -> Result<Preset> {
        let path = dir.as_ref().join(format!("preset-{}.yml", cluster));
        info!("loading cluster preset: {}", path.display());
        Preset::load_file(path)
    }

    /// The kubeconfig document as bytes, empty when the preset carries none.
    pub fn kubeconfig_bytes(&self) -> Result<Vec<u8>> {
        match &self.kubeconfig {
            Some(value) => {
                let content = serde_yaml::to_string(value).map_err(Error::YamlParseFailed)?;
                Ok(content.into_bytes())
            }
            None => Ok(Vec::new()),
        }
    }

    /// The docker config document as bytes.
    pub fn dockerconfig_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.dockerconfig).map_err(Error::SerializationError)
    }
}

/// The default presets directory, `~/.gantry`.
pub fn default_presets_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| Error::MissingEnvironment("HOME"))?;
    Ok(PathBuf::from(home).join(".gantry"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESET: &str = r#"
registry: registry.example.com
annotations:
  owner: platform
imagePullSecrets:
  - pull-secret
resource:
  cpu: "100:200"
kubeconfig:
  apiVersion: v1
  kind: Config
dockerconfig:
  auths:
    registry.example.com:
      auth: dXNlcjpwYXNz
"#;

    #[test]
    fn test_load() {
        let preset = Preset::load(PRESET).unwrap();

        assert_eq!(preset.registry, "registry.example.com");
        assert_eq!(preset.annotations.get("owner"), Some(&"platform".to_string()));
        assert_eq!(preset.image_pull_secrets, vec!["pull-secret".to_string()]);
        assert_eq!(preset.resource.cpu, Some("100:200".parse().unwrap()));
        assert_eq!(preset.resource.mem, None);
    }

    #[test]
    fn test_credential_bytes() {
        let preset = Preset::load(PRESET).unwrap();

        let kubeconfig = String::from_utf8(preset.kubeconfig_bytes().unwrap()).unwrap();
        assert!(kubeconfig.contains("kind: Config"));

        let dockerconfig = String::from_utf8(preset.dockerconfig_bytes().unwrap()).unwrap();
        assert!(dockerconfig.contains("dXNlcjpwYXNz"));
    }

    #[test]
    fn test_empty_kubeconfig() {
        let preset = Preset::load("registry: r.example.com").unwrap();
        assert_eq!(preset.kubeconfig_bytes().unwrap(), Vec::<u8>::new());
    }
}
