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

//! Engine configuration: the raw parameter table, its typed view and the
//! command-line parser that produces it.

mod args;
mod engine_parameters;
mod parameters;

pub use args::{log_level_from_name, parameters_from_env_args, parse_parameters, PREFIX_PATH_ENV};
pub use engine_parameters::{
    EngineParameters, LogSettings, DEFAULT_AUTOLOAD_PATH, DEFAULT_RESOURCE_PATH,
};
pub use parameters::{ParameterTable, Variant};
