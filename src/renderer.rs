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
use std::fmt::Write;

use minijinja::{context, Environment, UndefinedBehavior};
use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::manifest::Profile;

/// The literal text an undefined variable renders as. Its presence in a
/// rendered script is the signal that a profile's `vars` map is incomplete.
pub const MISSING_VALUE: &str = "<no value>";

const BUILD_PREAMBLE: &str = "#!/bin/bash\nset -eux\n";

fn environment() -> Environment<'static> {
    let mut env = Environment::new();

    // Missing keys render as the marker instead of failing, so a partially
    // specified vars map degrades to a diagnosable script rather than a
    // broken run.
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_formatter(|out, state, value| {
        if value.is_undefined() {
            write!(out, "{}", MISSING_VALUE)?;
            return Ok(());
        }
        minijinja::escape_formatter(out, state, value)
    });

    env.add_function("upper", |s: String| s.to_uppercase());
    env.add_function("lower", |s: String| s.to_lowercase());
    env.add_function("trim", |s: String| s.trim().to_string());
    env.add_function("replace", |s: String, from: String, to: String| s.replace(&from, &to));

    env
}

/// Render one templating pass over `source`, exposing the process
/// environment as `Env`, the profile's vars as `Vars` and the profile name
/// as `Profile`.
fn render(profile: &Profile, source: &str) -> Result<Vec<u8>> {
    let envs: HashMap<String, String> = std::env::vars().collect();
    let vars = profile.vars.clone().unwrap_or_default();

    let output = environment()
        .render_str(
            source,
            context! {
                Env => envs,
                Vars => vars,
                Profile => profile.name,
            },
        )
        .map_err(Error::RenderError)?;

    Ok(output.into_bytes())
}

/// The build script: the profile's build lines behind a strict-mode bash
/// preamble, rendered once.
pub fn build_script(profile: &Profile) -> Result<Vec<u8>> {
    let mut source = String::from(BUILD_PREAMBLE);
    for line in profile.build.iter().flatten() {
        source.push_str(line);
        source.push('\n');
    }
    render(profile, &source)
}

/// The packaging script (a Dockerfile): the profile's package lines joined
/// as-is, no preamble.
pub fn package_script(profile: &Profile) -> Result<Vec<u8>> {
    render(profile, &profile.package.clone().unwrap_or_default().join("\n"))
}

/// Log the rendered script and surface an operator-visible warning when the
/// missing-value marker leaked into the output. Warning only; an incomplete
/// vars map never fails the run.
pub fn preview(title: &str, profile: &str, content: &str) {
    info!(
        "{}:\n--------------------------------------------------\n{}\n--------------------------------------------------",
        title,
        content.trim()
    );
    if content.contains(MISSING_VALUE) {
        warn!("rendered {} contains \"{}\"; check that profile {} is the intended environment and that its vars are complete", title, MISSING_VALUE, profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_with_vars(vars: &[(&str, serde_json::Value)]) -> Profile {
        Profile {
            name: "test".into(),
            vars: Some(vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_vars() {
        let mut profile = profile_with_vars(&[("hello", json!("world"))]);
        profile.package = Some(vec!["RUN echo {{Vars.hello}}".into()]);

        let output = package_script(&profile).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "RUN echo world");
    }

    #[test]
    fn test_render_profile_name() {
        let mut profile = profile_with_vars(&[]);
        profile.package = Some(vec!["LABEL env={{Profile}}".into()]);

        let output = package_script(&profile).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "LABEL env=test");
    }

    #[test]
    fn test_render_env() {
        std::env::set_var("GANTRY_RENDER_TEST", "ok");
        let mut profile = profile_with_vars(&[]);
        profile.package = Some(vec!["RUN echo {{Env.GANTRY_RENDER_TEST}}".into()]);

        let output = package_script(&profile).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "RUN echo ok");
    }

    #[test]
    fn test_missing_key_renders_marker() {
        let mut profile = profile_with_vars(&[]);
        profile.package = Some(vec!["RUN echo {{Vars.missing}}".into()]);

        let output = package_script(&profile).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), format!("RUN echo {}", MISSING_VALUE));
    }

    #[test]
    fn test_render_functions() {
        let mut profile = profile_with_vars(&[("name", json!("gantry"))]);
        profile.package = Some(vec!["LABEL app={{upper(Vars.name)}}".into()]);

        let output = package_script(&profile).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "LABEL app=GANTRY");
    }

    #[test]
    fn test_build_script_preamble() {
        let mut profile = profile_with_vars(&[]);
        profile.build = Some(vec!["make build".into(), "make test".into()]);

        let output = build_script(&profile).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "#!/bin/bash\nset -eux\nmake build\nmake test\n"
        );
    }

    #[test]
    fn test_syntax_error_is_render_error() {
        let mut profile = profile_with_vars(&[]);
        profile.package = Some(vec!["RUN echo {% endfor %}".into()]);

        let err = package_script(&profile).unwrap_err();
        assert!(matches!(err, Error::RenderError(_)));
    }
}
