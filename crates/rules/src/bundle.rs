// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rules bundles on disk
//!
//! A downloaded bundle is either a zip archive holding `rules.json` plus an
//! optional `assets/` folder, or a bare JSON rules document. Handlers unpack
//! either form into a directory that `load_rules_dir` reads back.

use crate::rule::{parse_rules, Rule, RuleError};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RULES_FILE: &str = "rules.json";
pub const ASSETS_DIR: &str = "assets";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("bundle entry escapes the output directory: {0}")]
    UnsafeEntry(String),
    #[error("bundle is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Unpacks one downloaded bundle into `output_dir`
pub trait BundleHandler: Send + Sync {
    fn process(&self, bundle: &Path, output_dir: &Path) -> Result<(), BundleError>;
}

/// Extracts zip bundles
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipBundleHandler;

impl BundleHandler for ZipBundleHandler {
    fn process(&self, bundle: &Path, output_dir: &Path) -> Result<(), BundleError> {
        let mut archive = zip::ZipArchive::new(File::open(bundle)?)?;
        fs::create_dir_all(output_dir)?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let relative = entry
                .enclosed_name()
                .map(|p| p.to_path_buf())
                .ok_or_else(|| BundleError::UnsafeEntry(entry.name().to_string()))?;
            let target = output_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
        tracing::debug!(bundle = %bundle.display(), entries = archive.len(), "extracted rules bundle");
        Ok(())
    }
}

/// Copies a bare JSON rules document in as `rules.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBundleHandler;

impl BundleHandler for JsonBundleHandler {
    fn process(&self, bundle: &Path, output_dir: &Path) -> Result<(), BundleError> {
        let content = fs::read_to_string(bundle)?;
        // reject garbage before replacing a good rules file
        serde_json::from_str::<serde_json::Value>(&content)?;
        fs::create_dir_all(output_dir)?;
        fs::write(output_dir.join(RULES_FILE), content)?;
        Ok(())
    }
}

/// Picks the handler by sniffing the file's leading bytes
pub fn handler_for(bundle: &Path) -> Result<Box<dyn BundleHandler>, BundleError> {
    let mut magic = [0u8; 4];
    let mut file = File::open(bundle)?;
    let read = file.read(&mut magic)?;
    if read == ZIP_MAGIC.len() && magic == ZIP_MAGIC {
        Ok(Box::new(ZipBundleHandler))
    } else {
        Ok(Box::new(JsonBundleHandler))
    }
}

/// Rules read back from an unpacked bundle
#[derive(Debug, Clone, Default)]
pub struct LoadedRules {
    pub rules: Vec<Rule>,
    /// `<dir>/assets` when the bundle shipped one
    pub assets_path: Option<PathBuf>,
}

pub fn load_rules_dir(dir: &Path) -> Result<LoadedRules, RuleError> {
    let content = fs::read_to_string(dir.join(RULES_FILE))?;
    let rules = parse_rules(&content)?;
    let assets = dir.join(ASSETS_DIR);
    Ok(LoadedRules {
        rules,
        assets_path: assets.is_dir().then_some(assets),
    })
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
