use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::math::transform_point;
use crate::render::backend::{RenderBackend, RenderReport, RendererKind};
use crate::render::params::{CameraState, HeadLight, RenderParams};
use crate::render::raster::{Band, DrawContext, DrawList, rasterize_band};
use crate::render::surface::DrawableSurface;
use crate::scene::geometry::{PreparedMesh, prepare_prim, refine_level};
use crate::scene::model::{Purpose, Visibility};
use crate::scene::stage::{PrimId, Stage};

/// Rows per band for the parallel schedule.
const BAND_ROWS: usize = 16;

/// How rasterization work is scheduled.
#[derive(Clone, Debug)]
pub(crate) enum Schedule {
    Serial,
    Bands(Arc<rayon::ThreadPool>),
}

/// Software rasterizer behind both renderer kinds.
pub(crate) struct CpuRenderer {
    schedule: Schedule,
    camera: Option<CameraState>,
    light: Option<HeadLight>,
    cache: HashMap<(PrimId, u32), PreparedMesh>,
}

impl CpuRenderer {
    pub(crate) fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            camera: None,
            light: None,
            cache: HashMap::new(),
        }
    }

    pub(crate) fn cached_meshes(&self) -> usize {
        self.cache.len()
    }
}

impl RenderBackend for CpuRenderer {
    fn kind(&self) -> RendererKind {
        match self.schedule {
            Schedule::Serial => RendererKind::Simple,
            Schedule::Bands(_) => RendererKind::Opt,
        }
    }

    fn set_camera_state(&mut self, state: CameraState) {
        self.camera = Some(state);
    }

    fn set_lighting(&mut self, light: Option<HeadLight>) {
        self.light = light;
    }

    fn render(
        &mut self,
        stage: &Stage,
        root: PrimId,
        params: &RenderParams,
        surface: &mut dyn DrawableSurface,
    ) -> StagecastResult<RenderReport> {
        let camera = self
            .camera
            .clone()
            .ok_or_else(|| StagecastError::render("camera state was not set before rendering"))?;
        if params.force_refresh {
            self.cache.clear();
        }
        let refine = refine_level(params.complexity);
        let time = params.frame.as_time();

        let light = self.light.filter(|_| params.enable_lighting).map(|l| HeadLight {
            position: transform_point(&camera.view, &l.position),
            ..l
        });
        let ctx = DrawContext {
            camera,
            draw_mode: params.draw_mode,
            cull_style: params.cull_style,
            light,
        };

        let mut list = DrawList::new();
        let mut prims_drawn = 0;
        for id in drawable_prims(stage, root, params) {
            let mesh = match self.cache.entry((id, refine)) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(v) => match prepare_prim(&stage.prim(id).kind, refine) {
                    Some(m) => v.insert(m),
                    None => continue,
                },
            };
            let model = stage.world_transform(id, time)?;
            list.push_mesh(mesh, &model, &ctx);
            prims_drawn += 1;
        }

        let fb = surface.framebuffer_mut();
        let width = fb.resolution().width;
        let row_len = width as usize;
        let (color, depth) = fb.planes_mut();
        let planes = params.clip_planes.as_slice();
        match &self.schedule {
            Schedule::Serial => {
                let rows = (depth.len() / row_len) as u32;
                let mut band = Band {
                    y0: 0,
                    rows,
                    width,
                    color,
                    depth,
                };
                rasterize_band(&list, &mut band, planes);
            }
            Schedule::Bands(pool) => pool.install(|| {
                color
                    .par_chunks_mut(row_len * 3 * BAND_ROWS)
                    .zip(depth.par_chunks_mut(row_len * BAND_ROWS))
                    .enumerate()
                    .for_each(|(i, (color, depth))| {
                        let mut band = Band {
                            y0: (i * BAND_ROWS) as u32,
                            rows: (depth.len() / row_len) as u32,
                            width,
                            color,
                            depth,
                        };
                        rasterize_band(&list, &mut band, planes);
                    });
            }),
        }

        let report = RenderReport {
            prims_drawn,
            triangles: list.triangle_count(),
            lines: list.line_count(),
        };
        tracing::debug!(
            frame = params.frame.0,
            prims = report.prims_drawn,
            triangles = report.triangles,
            lines = report.lines,
            "rasterized"
        );
        Ok(report)
    }
}

fn purpose_enabled(purpose: Purpose, params: &RenderParams) -> bool {
    match purpose {
        Purpose::Default => true,
        Purpose::Render => params.show_render,
        Purpose::Proxy => params.show_proxy,
        Purpose::Guide => params.show_guides,
    }
}

/// Gprims under `root` that are visible and have an enabled purpose, in traversal order.
///
/// Invisibility and non-default purposes inherit down the hierarchy.
fn drawable_prims(stage: &Stage, root: PrimId, params: &RenderParams) -> Vec<PrimId> {
    let mut out = Vec::new();
    if stage.is_hidden(root) {
        return out;
    }
    let mut inherited = Purpose::Default;
    let mut cursor = stage.prim(root).parent;
    while let Some(id) = cursor {
        let prim = stage.prim(id);
        if prim.purpose != Purpose::Default {
            inherited = prim.purpose;
            break;
        }
        cursor = prim.parent;
    }

    let mut stack = vec![(root, inherited)];
    while let Some((id, purpose)) = stack.pop() {
        let prim = stage.prim(id);
        if prim.visibility == Visibility::Invisible {
            continue;
        }
        let purpose = if prim.purpose == Purpose::Default {
            purpose
        } else {
            prim.purpose
        };
        if !purpose_enabled(purpose, params) {
            continue;
        }
        if prim.kind.is_gprim() {
            out.push(id);
        }
        stack.extend(prim.children.iter().rev().map(|c| (*c, purpose)));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
