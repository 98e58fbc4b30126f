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

/// The ordered set of image references produced by one build. The first entry
/// is the primary reference, used for the final push and for the patch.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageNames(Vec<String>);

impl ImageNames {
    /// Tags for one image/profile build: a per-build tag when a build number
    /// is known, always followed by the stable `image:profile` tag.
    pub fn for_build(image: &str, profile: &str, build_number: Option<&str>) -> ImageNames {
        let mut names = Vec::new();
        if let Some(number) = build_number {
            names.push(format!("{}:{}-build-{}", image, profile, number));
        }
        names.push(format!("{}:{}", image, profile));
        ImageNames(names)
    }

    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    /// The same references addressed through a registry.
    pub fn derive(&self, registry: &str) -> ImageNames {
        ImageNames(
            self.0
                .iter()
                .map(|name| format!("{}/{}", registry.trim_end_matches('/'), name))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
