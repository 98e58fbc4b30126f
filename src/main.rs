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

use std::fs;

use clap::Parser;
use tracing::{info, Level};

use gantry::image::ImageNames;
use gantry::manifest::Manifest;
use gantry::preset::{self, Preset};
use gantry::{patch, renderer};

mod config;

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    // This returns an error if the `.env` file doesn't exist, but that's not
    // what we want since CI runs won't carry one.
    dotenv::dotenv().ok();

    let config = Config::parse();
    let (image, profile_name) = config.job()?;

    info!("manifest: {}", config.manifest.display());
    let manifest = Manifest::load_file(&config.manifest)?;

    info!("profile: {}", profile_name);
    let mut profile = manifest.resolve(&profile_name)?;

    // Command-line quota overrides replace the profile's values wholesale.
    if let Some(cpu) = config.cpu {
        profile.resource.cpu = Some(cpu);
    }
    if let Some(mem) = config.mem {
        profile.resource.mem = Some(mem);
    }

    fs::create_dir_all(&config.output)?;

    let build = renderer::build_script(&profile)?;
    renderer::preview("build script", &profile.name, &String::from_utf8_lossy(&build));
    let build_file = config.output.join("build.sh");
    fs::write(&build_file, &build)?;
    info!("wrote build script: {}", build_file.display());

    let package = renderer::package_script(&profile)?;
    renderer::preview("package script", &profile.name, &String::from_utf8_lossy(&package));
    let package_file = config.output.join("package.dockerfile");
    fs::write(&package_file, &package)?;
    info!("wrote package script: {}", package_file.display());

    let names = ImageNames::for_build(&image, &profile_name, config.build_number().as_deref());
    let presets_dir = match &config.presets_dir {
        Some(dir) => dir.clone(),
        None => preset::default_presets_dir()?,
    };

    for target in &config.workloads {
        info!("assembling patch for {}", target);

        let preset = Preset::load_for_cluster(&presets_dir, &target.cluster)?;
        let remote = names.derive(&preset.registry);
        for name in remote.iter() {
            info!("image reference: {}", name);
        }

        let document = patch::assemble(&preset, &profile, target, remote.primary());
        let file = config.output.join(format!(
            "patch-{}-{}-{}-{}.json",
            target.cluster, target.namespace, target.kind, target.name
        ));
        fs::write(&file, serde_json::to_vec_pretty(&document)?)?;
        info!("wrote patch: {}", file.display());
    }

    Ok(())
}
