use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::foundation::error::{StagecastError, StagecastResult};

/// Environment variable holding `:`-separated search paths for [`FileResolver::from_env`].
pub const ASSET_PATH_ENV: &str = "STAGECAST_ASSET_PATH";

/// Maps authored asset paths to resolved identifiers and reads their bytes.
///
/// Resolution is anchored: relative asset paths are interpreted against the resolved identifier
/// of the layer that references them (`anchor`). The root layer is resolved without an anchor.
pub trait AssetResolver: Send + Sync {
    /// Resolve `asset_path` as referenced from `anchor`.
    fn resolve(&self, asset_path: &str, anchor: Option<&str>) -> StagecastResult<String>;

    /// Read the bytes of a previously resolved identifier.
    fn read(&self, resolved: &str) -> StagecastResult<Vec<u8>>;
}

/// Filesystem resolver: anchor-relative lookup first, then search paths.
///
/// Paths starting with `./` or `../` are only looked up relative to the anchor.
#[derive(Clone, Debug, Default)]
pub struct FileResolver {
    search_paths: Vec<PathBuf>,
}

impl FileResolver {
    /// Resolver without search paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with explicit search paths, tried in order.
    pub fn with_search_paths(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_paths: search_paths.into_iter().collect(),
        }
    }

    /// Resolver whose search paths come from [`ASSET_PATH_ENV`].
    pub fn from_env() -> Self {
        let paths = std::env::var(ASSET_PATH_ENV).unwrap_or_default();
        Self::with_search_paths(parse_search_paths(&paths))
    }

    /// Configured search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn candidates(&self, asset_path: &str, anchor: Option<&str>) -> Vec<PathBuf> {
        let p = Path::new(asset_path);
        if p.is_absolute() {
            return vec![p.to_path_buf()];
        }

        let mut out = Vec::new();
        let anchor_dir = anchor
            .map(Path::new)
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        match anchor_dir {
            Some(dir) => out.push(dir.join(p)),
            None => out.push(p.to_path_buf()),
        }

        let search_relative = asset_path.starts_with("./") || asset_path.starts_with("../");
        if !search_relative {
            out.extend(self.search_paths.iter().map(|dir| dir.join(p)));
        }
        out
    }
}

impl AssetResolver for FileResolver {
    fn resolve(&self, asset_path: &str, anchor: Option<&str>) -> StagecastResult<String> {
        let candidates = self.candidates(asset_path, anchor);
        for c in &candidates {
            if c.is_file() {
                let resolved = std::fs::canonicalize(c).unwrap_or_else(|_| c.clone());
                return Ok(resolved.to_string_lossy().into_owned());
            }
        }
        Err(StagecastError::scene(format!(
            "cannot resolve asset '{asset_path}' (tried {})",
            candidates
                .iter()
                .map(|c| format!("'{}'", c.display()))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn read(&self, resolved: &str) -> StagecastResult<Vec<u8>> {
        std::fs::read(resolved)
            .map_err(|e| StagecastError::scene(format!("read asset '{resolved}': {e}")))
    }
}

/// Split a `:`-separated search path list, dropping empty entries.
pub fn parse_search_paths(s: &str) -> Vec<PathBuf> {
    s.split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// In-memory resolver keyed by identifier.
///
/// Identifiers are `/`-separated names such as `memory://shots/a.json`; relative references are
/// joined onto the anchor's directory and normalized.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an asset.
    pub fn insert(&mut self, identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(identifier.into(), bytes.into());
    }

    /// Builder-style [`MemoryResolver::insert`].
    pub fn with_asset(mut self, identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(identifier, bytes);
        self
    }
}

impl AssetResolver for MemoryResolver {
    fn resolve(&self, asset_path: &str, anchor: Option<&str>) -> StagecastResult<String> {
        let candidate = if uri_scheme(asset_path).is_some() || asset_path.starts_with('/') {
            asset_path.to_string()
        } else {
            match anchor.and_then(|a| a.rsplit_once('/')) {
                Some((dir, _)) => normalize_slash_path(&format!("{dir}/{asset_path}"))?,
                None => normalize_slash_path(asset_path)?,
            }
        };
        if self.assets.contains_key(&candidate) {
            Ok(candidate)
        } else {
            Err(StagecastError::scene(format!(
                "cannot resolve in-memory asset '{asset_path}' (as '{candidate}')"
            )))
        }
    }

    fn read(&self, resolved: &str) -> StagecastResult<Vec<u8>> {
        self.assets
            .get(resolved)
            .cloned()
            .ok_or_else(|| StagecastError::scene(format!("unknown in-memory asset '{resolved}'")))
    }
}

/// Collapse `.` and `..` elements of a `/`-separated path, keeping a `scheme://` prefix intact.
fn normalize_slash_path(s: &str) -> StagecastResult<String> {
    let (prefix, rest) = match s.find("://") {
        Some(i) => s.split_at(i + 3),
        None => ("", s),
    };
    let mut out: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(StagecastError::scene(format!(
                        "asset path '{s}' escapes its root"
                    )));
                }
            }
            p => out.push(p),
        }
    }
    if out.is_empty() {
        return Err(StagecastError::scene(format!(
            "asset path '{s}' must contain a file name"
        )));
    }
    Ok(format!("{prefix}{}", out.join("/")))
}

/// URI scheme of `s` (`memory` for `memory://a.json`), if any.
pub(crate) fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Dispatches identifiers to resolvers registered per URI scheme.
///
/// Asset paths without a scheme follow their anchor's scheme; when neither has one, the
/// fallback resolver is used.
pub struct SchemeResolver {
    schemes: BTreeMap<String, Box<dyn AssetResolver>>,
    fallback: Box<dyn AssetResolver>,
}

impl SchemeResolver {
    /// Dispatcher that falls back to `fallback` for plain paths.
    pub fn new(fallback: impl AssetResolver + 'static) -> Self {
        Self {
            schemes: BTreeMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register `resolver` for identifiers starting with `scheme://`.
    pub fn register(
        mut self,
        scheme: impl Into<String>,
        resolver: impl AssetResolver + 'static,
    ) -> Self {
        self.schemes
            .insert(scheme.into().to_ascii_lowercase(), Box::new(resolver));
        self
    }

    fn pick(&self, s: Option<&str>) -> StagecastResult<&dyn AssetResolver> {
        match s.and_then(uri_scheme) {
            Some(scheme) => self
                .schemes
                .get(&scheme.to_ascii_lowercase())
                .map(|r| &**r)
                .ok_or_else(|| {
                    StagecastError::scene(format!("no resolver registered for scheme '{scheme}'"))
                }),
            None => Ok(&*self.fallback),
        }
    }
}

impl AssetResolver for SchemeResolver {
    fn resolve(&self, asset_path: &str, anchor: Option<&str>) -> StagecastResult<String> {
        let dispatch_on = if uri_scheme(asset_path).is_some() {
            Some(asset_path)
        } else {
            anchor
        };
        self.pick(dispatch_on)?.resolve(asset_path, anchor)
    }

    fn read(&self, resolved: &str) -> StagecastResult<Vec<u8>> {
        self.pick(Some(resolved))?.read(resolved)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolver.rs"]
mod tests;
