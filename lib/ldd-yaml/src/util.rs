/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

/// Load the first document of a yaml string, `Yaml::Null` if there is none.
pub fn load_str(s: &str) -> anyhow::Result<Yaml> {
    let mut docs = YamlLoader::load_from_str(s).context("invalid yaml string")?;
    match docs.len() {
        0 => Ok(Yaml::Null),
        1 => Ok(docs.remove(0)),
        n => Err(anyhow!("expect a single yaml document, found {n}")),
    }
}
