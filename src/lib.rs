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

//! Gantry turns a declarative, multi-environment build/deploy descriptor
//! into rendered build/packaging scripts and sparse Kubernetes workload
//! patches. It resolves environment profiles against a shared default,
//! renders the profile's script lines through one templating pass, and
//! combines a cluster preset, the resolved profile and a workload target
//! into one patch document per target. Submitting those documents to docker
//! and the cluster is left to external collaborators.

pub mod check;
pub mod errors;
pub mod image;
pub mod manifest;
pub mod patch;
pub mod preset;
pub mod quota;
pub mod renderer;
pub mod workload;
