use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::Mat4;
use crate::scene::model::{Layer, PrimDef, PrimKind, Purpose, Visibility, XformOps};
use crate::scene::path::ScenePath;
use crate::scene::resolver::{AssetResolver, FileResolver};
use crate::scene::samples::Sampled;

/// Index of a prim in a [`Stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimId(pub(crate) u32);

impl PrimId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A composed prim.
#[derive(Clone, Debug)]
pub struct Prim {
    /// Absolute path.
    pub path: ScenePath,
    /// Parent prim (`None` for the pseudo-root).
    pub parent: Option<PrimId>,
    /// Children in authored order (authored children first, then referenced roots).
    pub children: Vec<PrimId>,
    /// Schema type and attributes.
    pub kind: PrimKind,
    /// Local transform.
    pub transform: Option<Sampled<XformOps>>,
    /// Authored visibility.
    pub visibility: Visibility,
    /// Authored purpose.
    pub purpose: Purpose,
    /// Index into [`Stage::layer_identifiers`] of the layer that authored this prim.
    pub layer: usize,
}

/// A fully loaded scene graph.
///
/// Opening a stage loads every layer reachable from the root layer up front; no part of the
/// scene is loaded lazily.
#[derive(Clone, Debug)]
pub struct Stage {
    layers: Vec<String>,
    prims: Vec<Prim>,
    index: HashMap<ScenePath, PrimId>,
}

impl Stage {
    /// Open a stage from a file using a [`FileResolver`] configured from the environment.
    pub fn open(path: impl AsRef<Path>) -> StagecastResult<Self> {
        let path = path.as_ref();
        let resolver = FileResolver::from_env();
        Self::open_with_resolver(&path.to_string_lossy(), &resolver)
    }

    /// Open a stage whose root layer is `root_asset`, resolving every layer through `resolver`.
    #[tracing::instrument(skip(resolver))]
    pub fn open_with_resolver(
        root_asset: &str,
        resolver: &dyn AssetResolver,
    ) -> StagecastResult<Self> {
        let root_id = resolver.resolve(root_asset, None)?;
        let mut loader = Loader {
            resolver,
            parsed: HashMap::new(),
            stack: Vec::new(),
            stage: Stage::empty(Vec::new()),
        };
        loader.graft_layer(&root_id, Self::pseudo_root())?;

        let stage = loader.stage;
        tracing::info!(
            root = %root_id,
            layers = stage.layers.len(),
            prims = stage.prims.len() - 1,
            "stage opened"
        );
        Ok(stage)
    }

    /// Build a stage from an in-memory layer (references resolve through `resolver`).
    pub fn from_layer(
        identifier: &str,
        layer: &Layer,
        resolver: &dyn AssetResolver,
    ) -> StagecastResult<Self> {
        layer.validate()?;
        let mut loader = Loader {
            resolver,
            parsed: HashMap::new(),
            stack: vec![identifier.to_string()],
            stage: Stage::empty(vec![identifier.to_string()]),
        };
        for def in &layer.prims {
            loader.add_prim(def, Self::pseudo_root(), identifier, 0)?;
        }
        Ok(loader.stage)
    }

    fn empty(layers: Vec<String>) -> Self {
        let mut index = HashMap::new();
        index.insert(ScenePath::root(), Self::pseudo_root());
        Self {
            layers,
            prims: vec![Prim {
                path: ScenePath::root(),
                parent: None,
                children: Vec::new(),
                kind: PrimKind::Scope,
                transform: None,
                visibility: Visibility::Inherited,
                purpose: Purpose::Default,
                layer: 0,
            }],
            index,
        }
    }

    /// The pseudo-root prim `/`.
    pub fn pseudo_root() -> PrimId {
        PrimId(0)
    }

    /// Resolved identifiers of every loaded layer; the root layer comes first.
    pub fn layer_identifiers(&self) -> &[String] {
        &self.layers
    }

    /// Number of prims, excluding the pseudo-root.
    pub fn prim_count(&self) -> usize {
        self.prims.len() - 1
    }

    /// Look up a prim by path.
    pub fn prim_at_path(&self, path: &ScenePath) -> Option<PrimId> {
        self.index.get(path).copied()
    }

    /// Borrow a prim.
    pub fn prim(&self, id: PrimId) -> &Prim {
        &self.prims[id.idx()]
    }

    /// Local-to-parent transform at `time`.
    pub fn local_transform(&self, id: PrimId, time: f64) -> StagecastResult<Mat4> {
        let prim = self.prim(id);
        if matches!(prim.kind, PrimKind::Scope) {
            return Ok(Mat4::identity());
        }
        match &prim.transform {
            Some(t) => Ok(t.sample(time)?.to_matrix()),
            None => Ok(Mat4::identity()),
        }
    }

    /// Local-to-world transform at `time`, composing every ancestor.
    pub fn world_transform(&self, id: PrimId, time: f64) -> StagecastResult<Mat4> {
        let mut m = self.local_transform(id, time)?;
        let mut cur = self.prim(id).parent;
        while let Some(p) = cur {
            m = self.local_transform(p, time)? * m;
            cur = self.prim(p).parent;
        }
        Ok(m)
    }

    /// Whether the prim or any ancestor is invisible.
    pub fn is_hidden(&self, id: PrimId) -> bool {
        let mut cur = Some(id);
        while let Some(p) = cur {
            let prim = self.prim(p);
            if prim.visibility == Visibility::Invisible {
                return true;
            }
            cur = prim.parent;
        }
        false
    }
}

struct Loader<'a> {
    resolver: &'a dyn AssetResolver,
    parsed: HashMap<String, Layer>,
    stack: Vec<String>,
    stage: Stage,
}

impl Loader<'_> {
    fn layer(&mut self, resolved: &str) -> StagecastResult<Layer> {
        if let Some(layer) = self.parsed.get(resolved) {
            return Ok(layer.clone());
        }
        let bytes = self.resolver.read(resolved)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| StagecastError::scene(format!("layer '{resolved}' is not UTF-8")))?;
        let layer = Layer::from_json(&text).map_err(|e| match e {
            StagecastError::Serde(msg) => {
                StagecastError::serde(format!("layer '{resolved}': {msg}"))
            }
            StagecastError::Scene(msg) => {
                StagecastError::scene(format!("layer '{resolved}': {msg}"))
            }
            other => other,
        })?;
        self.parsed.insert(resolved.to_string(), layer.clone());
        Ok(layer)
    }

    fn graft_layer(&mut self, resolved: &str, parent: PrimId) -> StagecastResult<()> {
        if self.stack.iter().any(|s| s == resolved) {
            return Err(StagecastError::scene(format!(
                "reference cycle: {} -> {resolved}",
                self.stack.join(" -> ")
            )));
        }
        let layer = self.layer(resolved)?;
        let layer_idx = match self.stage.layers.iter().position(|l| l == resolved) {
            Some(i) => i,
            None => {
                self.stage.layers.push(resolved.to_string());
                self.stage.layers.len() - 1
            }
        };
        tracing::debug!(layer = %resolved, under = %self.stage.prim(parent).path, "grafting layer");

        self.stack.push(resolved.to_string());
        for def in &layer.prims {
            self.add_prim(def, parent, resolved, layer_idx)?;
        }
        self.stack.pop();
        Ok(())
    }

    fn add_prim(
        &mut self,
        def: &PrimDef,
        parent: PrimId,
        layer_id: &str,
        layer_idx: usize,
    ) -> StagecastResult<()> {
        let path = self
            .stage
            .prim(parent)
            .path
            .child(&def.name)
            .map_err(|e| StagecastError::scene(e.to_string()))?;
        if self.stage.index.contains_key(&path) {
            return Err(StagecastError::scene(format!(
                "prim '{path}' is defined more than once (layer '{layer_id}')"
            )));
        }

        let id = PrimId(u32::try_from(self.stage.prims.len()).map_err(|_| {
            StagecastError::scene("too many prims in stage")
        })?);
        self.stage.prims.push(Prim {
            path: path.clone(),
            parent: Some(parent),
            children: Vec::new(),
            kind: def.kind.clone(),
            transform: def.transform.clone(),
            visibility: def.visibility,
            purpose: def.purpose,
            layer: layer_idx,
        });
        self.stage.prims[parent.idx()].children.push(id);
        self.stage.index.insert(path, id);

        for child in &def.children {
            self.add_prim(child, id, layer_id, layer_idx)?;
        }
        for asset in &def.references {
            let resolved = self.resolver.resolve(asset, Some(layer_id))?;
            self.graft_layer(&resolved, id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stage.rs"]
mod tests;
