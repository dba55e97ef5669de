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

use super::parameters::{ParameterTable, Variant};
use log::LevelFilter;

/// Environment variable that seeds `ResourcePrefixPaths`.
pub const PREFIX_PATH_ENV: &str = "GALE_PREFIX_PATH";

/// Resolves a log level by name (`trace`, `debug`, `info`, `warning`, `error`, `none`),
/// ignoring case.
pub fn log_level_from_name(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warning" | "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "none" | "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Reads the process arguments (minus the program name) and the prefix path
/// environment variable, and parses them into a parameter table.
pub fn parameters_from_env_args() -> ParameterTable {
    let arguments: Vec<String> = std::env::args().skip(1).collect();
    parse_parameters(&arguments, std::env::var(PREFIX_PATH_ENV).ok())
}

/// Parses engine command-line arguments into a parameter table.
///
/// Flags start with a single dash and are matched without regard to case.
/// Flags taking a value only consume the next argument when there is one.
/// `prefix_path` (normally the value of [`PREFIX_PATH_ENV`]) seeds
/// `ResourcePrefixPaths` and is overridden by `-pp`.
pub fn parse_parameters(arguments: &[String], prefix_path: Option<String>) -> ParameterTable {
    let mut table = ParameterTable::new();
    if let Some(paths) = prefix_path {
        table.insert("ResourcePrefixPaths", paths);
    }

    let mut i = 0;
    while i < arguments.len() {
        let current = &arguments[i];
        i += 1;

        if current.len() <= 1 || !current.starts_with('-') {
            continue;
        }
        let flag = current[1..].to_ascii_lowercase();
        let value = arguments.get(i).filter(|value| !value.is_empty());

        match flag.as_str() {
            "headless" => set(&mut table, "Headless", true),
            "nolimit" => set(&mut table, "FrameLimiter", false),
            "flushgpu" => set(&mut table, "FlushGPU", true),
            "gl2" => set(&mut table, "ForceGL2", true),
            "landscape" => prepend_orientations(&mut table, "LandscapeLeft LandscapeRight "),
            "portrait" => prepend_orientations(&mut table, "Portrait PortraitUpsideDown "),
            "nosound" => set(&mut table, "Sound", false),
            "noip" => set(&mut table, "SoundInterpolation", false),
            "mono" => set(&mut table, "SoundStereo", false),
            "prepass" => set(&mut table, "RenderPath", "shaders/render/Prepass.xml"),
            "deferred" => set(&mut table, "RenderPath", "shaders/render/Deferred.xml"),
            "noshadows" => set(&mut table, "Shadows", false),
            "lqshadows" => set(&mut table, "LowQualityShadows", true),
            "v" => set(&mut table, "VSync", true),
            "t" => set(&mut table, "TripleBuffer", true),
            "w" => set(&mut table, "FullScreen", false),
            "borderless" => set(&mut table, "Borderless", true),
            "s" => set(&mut table, "WindowResizable", true),
            "hd" => set(&mut table, "HighDPI", true),
            "q" => set(&mut table, "LogQuiet", true),
            "log" => {
                if let Some(level) = value.and_then(|name| log_level_index(name)) {
                    set(&mut table, "LogLevel", level);
                    i += 1;
                }
            }
            _ => {
                let Some(value) = value else {
                    continue;
                };
                match flag.as_str() {
                    "renderpath" => set(&mut table, "RenderPath", value.as_str()),
                    "x" => set(&mut table, "WindowWidth", to_int(value)),
                    "y" => set(&mut table, "WindowHeight", to_int(value)),
                    "monitor" => set(&mut table, "Monitor", to_int(value)),
                    "hz" => set(&mut table, "RefreshRate", to_int(value)),
                    "m" => set(&mut table, "MultiSample", to_int(value)),
                    "b" => set(&mut table, "SoundBuffer", to_int(value)),
                    "r" => set(&mut table, "SoundMixRate", to_int(value)),
                    "pp" => set(&mut table, "ResourcePrefixPaths", value.as_str()),
                    "p" => set(&mut table, "ResourcePaths", value.as_str()),
                    "pf" => set(&mut table, "ResourcePackages", value.as_str()),
                    "ap" => set(&mut table, "AutoloadPaths", value.as_str()),
                    "ds" => set(&mut table, "DumpShaders", value.as_str()),
                    "mq" => set(&mut table, "MaterialQuality", to_int(value)),
                    "tq" => set(&mut table, "TextureQuality", to_int(value)),
                    "tf" => set(&mut table, "TextureFilterMode", to_int(value)),
                    "af" => {
                        set(&mut table, "TextureFilterMode", 3);
                        set(&mut table, "TextureAnisotropy", to_int(value));
                    }
                    _ => {
                        log::debug!("Ignoring unknown argument '{current}'");
                        continue;
                    }
                }
                i += 1;
            }
        }
    }

    table
}

fn set(table: &mut ParameterTable, name: &str, value: impl Into<Variant>) {
    table.insert(name, value);
}

fn prepend_orientations(table: &mut ParameterTable, orientations: &str) {
    let existing = table
        .get("Orientations")
        .and_then(Variant::as_str)
        .unwrap_or_default()
        .to_string();
    table.insert("Orientations", format!("{orientations}{existing}"));
}

fn log_level_index(name: &str) -> Option<i64> {
    match name.to_ascii_uppercase().as_str() {
        "TRACE" => Some(0),
        "DEBUG" => Some(1),
        "INFO" => Some(2),
        "WARNING" => Some(3),
        "ERROR" => Some(4),
        _ => None,
    }
}

/// Leading-integer conversion; anything unparsable becomes zero.
fn to_int(value: &str) -> i64 {
    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .find(|&(index, c)| !(c.is_ascii_digit() || (index == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(index, _)| index);
    trimmed[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn boolean_flags_are_case_insensitive() {
        let table = parse_parameters(&args(&["-Headless", "-NOLIMIT", "-w", "-q"]), None);
        assert_eq!(table.get("Headless"), Some(&Variant::Bool(true)));
        assert_eq!(table.get("FrameLimiter"), Some(&Variant::Bool(false)));
        assert_eq!(table.get("FullScreen"), Some(&Variant::Bool(false)));
        assert_eq!(table.get("LogQuiet"), Some(&Variant::Bool(true)));
    }

    #[test]
    fn value_flags_consume_the_next_argument() {
        let table = parse_parameters(
            &args(&["-x", "1024", "-y", "768px", "-p", "data;core", "-af", "8"]),
            None,
        );
        assert_eq!(table.get("WindowWidth"), Some(&Variant::Int(1024)));
        assert_eq!(table.get("WindowHeight"), Some(&Variant::Int(768)));
        assert_eq!(
            table.get("ResourcePaths").and_then(Variant::as_str),
            Some("data;core")
        );
        assert_eq!(table.get("TextureFilterMode"), Some(&Variant::Int(3)));
        assert_eq!(table.get("TextureAnisotropy"), Some(&Variant::Int(8)));
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn value_flag_without_value_is_ignored() {
        let table = parse_parameters(&args(&["-headless", "-x"]), None);
        assert!(!table.has_parameter("WindowWidth"));
        assert!(table.has_parameter("Headless"));
    }

    #[test]
    fn log_level_requires_a_known_name() {
        let table = parse_parameters(&args(&["-log", "warning"]), None);
        assert_eq!(table.get("LogLevel"), Some(&Variant::Int(3)));

        // An unknown level leaves the following argument to be parsed as a flag.
        let table = parse_parameters(&args(&["-log", "-headless"]), None);
        assert!(!table.has_parameter("LogLevel"));
        assert!(table.has_parameter("Headless"));
    }

    #[test]
    fn environment_prefix_is_overridden_by_flag() {
        let table = parse_parameters(&[], Some("/env/".to_string()));
        assert_eq!(
            table.get("ResourcePrefixPaths").and_then(Variant::as_str),
            Some("/env/")
        );

        let table = parse_parameters(&args(&["-pp", "/flag/"]), Some("/env/".to_string()));
        assert_eq!(
            table.get("ResourcePrefixPaths").and_then(Variant::as_str),
            Some("/flag/")
        );
    }

    #[test]
    fn orientation_flags_accumulate() {
        let table = parse_parameters(&args(&["-landscape", "-portrait"]), None);
        assert_eq!(
            table.get("Orientations").and_then(Variant::as_str),
            Some("Portrait PortraitUpsideDown LandscapeLeft LandscapeRight ")
        );
    }

    #[test]
    fn plain_arguments_are_skipped() {
        let table = parse_parameters(&args(&["scene.xml", "-", "-v"]), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("VSync"), Some(&Variant::Bool(true)));
    }

    #[test]
    fn level_names_resolve() {
        assert_eq!(log_level_from_name("WARNING"), Some(LevelFilter::Warn));
        assert_eq!(log_level_from_name("verbose"), None);
    }
}
