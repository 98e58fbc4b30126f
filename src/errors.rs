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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("InvalidQuota: {0}")]
    InvalidQuota(String),

    #[error("InvalidWorkloadTarget: {0}")]
    InvalidWorkloadTarget(String),

    #[error("UnknownWorkloadType: {0}")]
    UnknownWorkloadType(String),

    #[error("UnsupportedManifestVersion: expected {expected}, found {found}")]
    UnsupportedManifestVersion { expected: u32, found: u32 },

    #[error("RenderError: {0}")]
    RenderError(#[source] minijinja::Error),

    #[error("SerializationError: {0}")]
    SerializationError(#[source] serde_json::Error),

    #[error("YamlParseFailed: {0}")]
    YamlParseFailed(#[source] serde_yaml::Error),

    #[error("IoError: {0}")]
    IoError(#[source] std::io::Error),

    #[error("MissingEnvironment: {0}")]
    MissingEnvironment(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
