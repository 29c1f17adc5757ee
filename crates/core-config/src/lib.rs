//! Option storage for the modal engine.
//!
//! Parses `vi-engine.toml` (or an override path provided by the host) into
//! [`Options`]. Every field is defaulted so a missing file, a missing table or
//! a missing key all yield vim-compatible defaults. Unknown fields are ignored
//! (TOML deserialization tolerance). Values outside their useful range are
//! clamped by [`Config::normalize`], which logs each adjustment on the
//! `config` target.
//!
//! ```toml
//! [edit]
//! shiftwidth = 4
//! expandtab = true
//! backspace = "permissive"
//!
//! [compat]
//! empty_region_error = true
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "vi-engine.toml";

/// How far Backspace may reach in Insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backspace {
    /// Vi behaviour: no joining lines, no deleting before the insert start.
    Compatible,
    /// Backspace over indent, line breaks and the start of insert.
    #[default]
    Permissive,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditOptions {
    #[serde(default = "EditOptions::default_shiftwidth")]
    pub shiftwidth: usize,
    #[serde(default = "EditOptions::default_tabstop")]
    pub tabstop: usize,
    #[serde(default)]
    pub expandtab: bool,
    #[serde(default)]
    pub shiftround: bool,
    #[serde(default)]
    pub autoindent: bool,
    #[serde(default = "EditOptions::default_startofline")]
    pub startofline: bool,
    #[serde(default)]
    pub backspace: Backspace,
    #[serde(default)]
    pub tildeop: bool,
    #[serde(default)]
    pub joinspaces: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            shiftwidth: Self::default_shiftwidth(),
            tabstop: Self::default_tabstop(),
            expandtab: false,
            shiftround: false,
            autoindent: false,
            startofline: Self::default_startofline(),
            backspace: Backspace::default(),
            tildeop: false,
            joinspaces: false,
        }
    }
}

impl EditOptions {
    const fn default_shiftwidth() -> usize {
        8
    }
    const fn default_tabstop() -> usize {
        8
    }
    const fn default_startofline() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchOptions {
    #[serde(default = "SearchOptions::default_wrapscan")]
    pub wrapscan: bool,
    #[serde(default)]
    pub ignorecase: bool,
    #[serde(default)]
    pub smartcase: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            wrapscan: Self::default_wrapscan(),
            ignorecase: false,
            smartcase: false,
        }
    }
}

impl SearchOptions {
    const fn default_wrapscan() -> bool {
        true
    }
}

/// Independent vi-compatibility switches (each mirrors one `cpoptions` flag).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompatOptions {
    /// Operating on an empty region beeps instead of being a silent no-op.
    #[serde(default)]
    pub empty_region_error: bool,
    /// `n` starts searching at the end of the previous match rather than one
    /// char after the cursor.
    #[serde(default)]
    pub search_continue: bool,
    /// A yank can be repeated with `.`.
    #[serde(default)]
    pub yank_redo: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitOptions {
    /// Ceiling on queued stuff/redo characters before "command too complex".
    #[serde(default = "LimitOptions::default_max_stuff_len")]
    pub max_stuff_len: usize,
    #[serde(default = "LimitOptions::default_undolevels")]
    pub undolevels: usize,
    /// Text rows of the host viewport (drives `H M L` and scrolling).
    #[serde(default = "LimitOptions::default_viewport_height")]
    pub viewport_height: usize,
}

impl Default for LimitOptions {
    fn default() -> Self {
        Self {
            max_stuff_len: Self::default_max_stuff_len(),
            undolevels: Self::default_undolevels(),
            viewport_height: Self::default_viewport_height(),
        }
    }
}

impl LimitOptions {
    const fn default_max_stuff_len() -> usize {
        10_000
    }
    const fn default_undolevels() -> usize {
        1000
    }
    const fn default_viewport_height() -> usize {
        24
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Options {
    #[serde(default)]
    pub edit: EditOptions,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub compat: CompatOptions,
    #[serde(default)]
    pub limits: LimitOptions,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub options: Options,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vi-engine").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<Options>(&content) {
        Ok(options) => {
            let mut cfg = Config {
                raw: Some(content),
                options,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            // Parse error falls back to defaults.
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

fn clamp_field(name: &'static str, value: &mut usize, min: usize, max: usize) {
    let raw = *value;
    let clamped = raw.clamp(min, max);
    if clamped != raw {
        info!(target: "config", option = name, raw, clamped, min, max, "option_clamped");
        *value = clamped;
    }
}

impl Config {
    /// Clamp numeric options into their usable ranges.
    pub fn normalize(&mut self) {
        let o = &mut self.options;
        clamp_field("shiftwidth", &mut o.edit.shiftwidth, 1, 64);
        clamp_field("tabstop", &mut o.edit.tabstop, 1, 64);
        clamp_field("max_stuff_len", &mut o.limits.max_stuff_len, 64, 1_000_000);
        clamp_field("undolevels", &mut o.limits.undolevels, 1, 100_000);
        clamp_field("viewport_height", &mut o.limits.viewport_height, 3, 1000);
    }
}
