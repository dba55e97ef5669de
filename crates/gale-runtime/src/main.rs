// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic Gale host.
//!
//! ```text
//! gale-runtime [--params FILE.json] [--frames N] [engine flags...]
//! ```
//!
//! Parameters from the JSON file are applied first and command-line engine
//! flags override them. Without `--frames` the loop runs until the engine
//! exits.

use anyhow::{bail, Context, Result};
use gale_core::config::{parse_parameters, PREFIX_PATH_ENV};
use gale_core::{ParameterTable, Time};
use gale_sdk::{Engine, NullPlatform};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, PartialEq)]
struct RuntimeOptions {
    parameter_file: Option<PathBuf>,
    max_frames: Option<u64>,
    engine_args: Vec<String>,
}

impl RuntimeOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--params" => {
                    let Some(path) = args.next() else {
                        bail!("--params requires a file");
                    };
                    options.parameter_file = Some(PathBuf::from(path));
                }
                "--frames" => {
                    let Some(count) = args.next() else {
                        bail!("--frames requires a count");
                    };
                    let count = count
                        .parse()
                        .with_context(|| format!("Invalid frame count '{count}'"))?;
                    options.max_frames = Some(count);
                }
                _ => options.engine_args.push(arg.clone()),
            }
        }
        Ok(options)
    }

    fn parameters(&self, prefix_env: Option<String>) -> Result<ParameterTable> {
        let mut parameters = match &self.parameter_file {
            Some(path) => load_parameter_file(path)?,
            None => ParameterTable::new(),
        };
        for (name, value) in parse_parameters(&self.engine_args, prefix_env).iter() {
            parameters.insert(name, value.clone());
        }
        Ok(parameters)
    }
}

fn load_parameter_file(path: &Path) -> Result<ParameterTable> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file '{}'", path.display()))?;
    ParameterTable::from_json_str(&json)
        .with_context(|| format!("Failed to parse parameter file '{}'", path.display()))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = RuntimeOptions::parse(&args)?;
    let parameters = options.parameters(std::env::var(PREFIX_PATH_ENV).ok())?;

    let mut engine = Engine::new(Box::new(NullPlatform::new()));
    engine
        .initialize(&parameters)
        .context("Failed to initialize the engine")?;
    log::info!("Started at {} UTC", Time::time_stamp());
    engine.dump_resources();

    let mut frames = 0u64;
    while !engine.is_exiting() {
        if options.max_frames.is_some_and(|max| frames >= max) {
            engine.exit();
            break;
        }
        engine.run_frame();
        frames += 1;
    }

    log::info!("Exited after {frames} frames");
    engine.dump_profiler();
    Ok(())
}
