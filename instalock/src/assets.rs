//! Resolution-keyed template assets.
//!
//! ```text
//! <assets>/<WxH>/avatars/<agent>.png
//! <assets>/<WxH>/lock_in.png
//! ```

use crate::detection::Template;
use crate::error::{Error, Result};
use crate::lock::LockTemplates;
use crate::resolution::Resolution;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const AVATARS_DIR: &str = "avatars";
const LOCK_IN_FILE: &str = "lock_in.png";

/// Templates captured at one screen resolution
#[derive(Debug, Clone)]
pub struct AssetSet {
    dir: PathBuf,
    resolution: Resolution,
}

impl AssetSet {
    /// Open the asset directory for `resolution`
    ///
    /// Fails with [`Error::UnsupportedResolution`] when no templates were
    /// captured at that resolution.
    pub fn open(assets_dir: impl AsRef<Path>, resolution: Resolution) -> Result<Self> {
        let assets_dir = assets_dir.as_ref();
        let dir = assets_dir.join(resolution.to_string());
        if !dir.is_dir() {
            let available = available_resolutions(assets_dir)
                .unwrap_or_default()
                .iter()
                .map(Resolution::to_string)
                .collect::<Vec<_>>();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(Error::UnsupportedResolution {
                resolution,
                dir,
                available,
            });
        }
        debug!(dir = %dir.display(), "Using template assets");
        Ok(Self { dir, resolution })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Agents with an avatar template, title-cased and sorted
    pub fn agents(&self) -> Result<Vec<String>> {
        let avatars = self.dir.join(AVATARS_DIR);
        if !avatars.is_dir() {
            return Ok(Vec::new());
        }

        let mut agents = Vec::new();
        for entry in fs::read_dir(&avatars)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("png") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    agents.push(display_name(stem));
                }
            }
        }

        agents.sort();
        agents.dedup();
        Ok(agents)
    }

    /// Path of the avatar template for `agent`, which must exist
    pub fn avatar_path(&self, agent: &str) -> Result<PathBuf> {
        let stem = normalize_agent(agent)?;
        existing(self.dir.join(AVATARS_DIR).join(format!("{}.png", stem)))
    }

    /// Path of the lock-in button template, which must exist
    pub fn lock_in_path(&self) -> Result<PathBuf> {
        existing(self.dir.join(LOCK_IN_FILE))
    }

    /// Load both templates needed to lock `agent`
    pub fn load_templates(&self, agent: &str) -> Result<LockTemplates> {
        let avatar = Template::open(self.avatar_path(agent)?)?;
        let lock_in = Template::open(self.lock_in_path()?)?;
        Ok(LockTemplates::new(agent, avatar, lock_in))
    }
}

/// Resolutions that have an asset directory, sorted
pub fn available_resolutions(assets_dir: impl AsRef<Path>) -> Result<Vec<Resolution>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(assets_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(res) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<Resolution>().ok())
        {
            found.push(res);
        }
    }
    found.sort();
    Ok(found)
}

/// Lowercase file stem for an agent name
pub fn normalize_agent(name: &str) -> Result<String> {
    let stem = name.trim().to_lowercase();
    if stem.is_empty()
        || stem.contains(['/', '\\'])
        || stem.contains("..")
        || stem.starts_with('.')
    {
        return Err(Error::InvalidAgent(name.to_string()));
    }
    Ok(stem)
}

/// Title-case an agent name: `jett` -> `Jett`, `kay-o` -> `Kay-O`
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.trim().chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::TemplateMissing(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_title_cases() {
        assert_eq!(display_name("jett"), "Jett");
        assert_eq!(display_name("KAY-O"), "Kay-O");
        assert_eq!(display_name(" sova "), "Sova");
    }

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize_agent("Jett").unwrap(), "jett");
    }

    #[test]
    fn normalize_rejects_paths() {
        for bad in ["", "   ", "../lock_in", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(normalize_agent(bad), Err(Error::InvalidAgent(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
