// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Writes the `ReverseNetwork` CRD manifest from the Rust type in src/crd.rs, so
//! deploy/crds/ never drifts from the code.
//!
//! Usage:
//!   cargo run --bin crdgen [OUTPUT_DIR]
//!
//! The output directory defaults to deploy/crds.

use kube::CustomResourceExt;
use ptrsync::crd::ReverseNetwork;
use std::fs;
use std::path::{Path, PathBuf};

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("deploy/crds"), PathBuf::from);

    fs::create_dir_all(&output_dir)?;

    generate_crd::<ReverseNetwork>("reversenetworks.crd.yaml", &output_dir)?;

    println!("Generated CRD YAML in {}", output_dir.display());
    println!("Deploy with: kubectl apply -f {}", output_dir.display());

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let yaml = serde_yaml::to_string(&T::crd())?;
    let output_path = output_dir.join(filename);
    fs::write(&output_path, format!("{COPYRIGHT_HEADER}{yaml}"))?;

    println!("  Generated {}", output_path.display());
    Ok(())
}
