//! Culling, bucketing and ordering of cached surfaces

use std::cmp::Ordering;

use cgmath::Point3;

use crate::error::Result;
use crate::gfx::camera::Camera;
use crate::gfx::surface::{DrawContext, DrawProperties, DrawStyle, SurfaceInstance};

/// Counters for one drawer pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Surfaces handed to the drawer
    pub considered: usize,
    /// Surfaces rejected by the camera
    pub culled: usize,
    pub prioritized: usize,
    pub opaque: usize,
    pub transparent: usize,
}

impl DrawStats {
    pub fn drawn(&self) -> usize {
        self.prioritized + self.opaque + self.transparent
    }
}

/// Surfaces split by draw style
///
/// The dependent bucket is only filled when classification is asked to split
/// off camera-relative surfaces (reflection passes).
#[derive(Debug, Default)]
pub struct DrawBuckets<'a> {
    pub dependent: Vec<SurfaceInstance<'a>>,
    pub prioritized: Vec<SurfaceInstance<'a>>,
    pub opaque: Vec<SurfaceInstance<'a>>,
    pub transparent: Vec<SurfaceInstance<'a>>,
}

impl<'a> DrawBuckets<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, instance: SurfaceInstance<'a>, split_dependent: bool) {
        if split_dependent && instance.has_draw_properties(DrawProperties::DEPENDANT_TRANSFORM) {
            self.dependent.push(instance);
            return;
        }
        match instance.properties().style {
            DrawStyle::Prioritized => self.prioritized.push(instance),
            DrawStyle::Opaque => self.opaque.push(instance),
            DrawStyle::Transparent => self.transparent.push(instance),
        }
    }

    /// Orders every bucket for drawing from `eye`
    pub fn sort(&mut self, eye: Point3<f32>, sort_opaque: bool) {
        sort_by_priority(&mut self.dependent);
        sort_by_priority(&mut self.prioritized);
        if sort_opaque {
            sort_by_distance(&mut self.opaque, eye, false);
        }
        sort_by_distance(&mut self.transparent, eye, true);
    }

    pub fn len(&self) -> usize {
        self.dependent.len() + self.prioritized.len() + self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.dependent.clear();
        self.prioritized.clear();
        self.opaque.clear();
        self.transparent.clear();
    }

    /// Prioritized, then opaque, then transparent; the dependent bucket is left
    /// to the caller
    pub fn draw_ordered(&self, ctx: &mut DrawContext<'_>) -> Result<()> {
        draw_bucket(&self.prioritized, ctx)?;
        draw_bucket(&self.opaque, ctx)?;
        draw_bucket(&self.transparent, ctx)
    }
}

pub fn draw_bucket(bucket: &[SurfaceInstance<'_>], ctx: &mut DrawContext<'_>) -> Result<()> {
    for instance in bucket {
        instance.draw(ctx)?;
    }
    Ok(())
}

fn sort_by_priority(bucket: &mut [SurfaceInstance<'_>]) {
    bucket.sort_by_key(|instance| instance.properties().priority);
}

fn sort_by_distance(bucket: &mut Vec<SurfaceInstance<'_>>, eye: Point3<f32>, far_to_near: bool) {
    let mut keyed: Vec<_> = bucket
        .drain(..)
        .map(|instance| (instance.distance2(eye), instance))
        .collect();

    keyed.sort_by(|(da, a), (db, b)| {
        let by_distance = if far_to_near {
            db.total_cmp(da)
        } else {
            da.total_cmp(db)
        };
        match by_distance {
            Ordering::Equal => a.properties().cull_mode.cmp(&b.properties().cull_mode),
            other => other,
        }
    });

    bucket.extend(keyed.into_iter().map(|(_, instance)| instance));
}

/// Draws a surface list for one camera and pass
pub struct SurfaceDrawer<'a> {
    buckets: DrawBuckets<'a>,
    sort_opaque: bool,
}

impl<'a> SurfaceDrawer<'a> {
    pub fn new(sort_opaque: bool) -> Self {
        Self {
            buckets: DrawBuckets::new(),
            sort_opaque,
        }
    }

    pub fn buckets(&self) -> &DrawBuckets<'a> {
        &self.buckets
    }

    /// Culls against `camera`, classifies and sorts, but draws nothing
    pub fn prepare(&mut self, surfaces: &[SurfaceInstance<'a>], camera: &Camera) -> DrawStats {
        self.buckets.clear();
        let mut stats = DrawStats {
            considered: surfaces.len(),
            ..DrawStats::default()
        };

        for instance in surfaces {
            if instance.is_visible_from(camera) {
                self.buckets.classify(*instance, false);
            } else {
                stats.culled += 1;
            }
        }
        self.buckets.sort(camera.position(), self.sort_opaque);

        stats.prioritized = self.buckets.prioritized.len();
        stats.opaque = self.buckets.opaque.len();
        stats.transparent = self.buckets.transparent.len();
        stats
    }

    /// Culls, orders and draws `surfaces` with `ctx.camera`, then empties the buckets
    pub fn draw(
        &mut self,
        surfaces: &[SurfaceInstance<'a>],
        ctx: &mut DrawContext<'_>,
    ) -> Result<DrawStats> {
        let stats = self.prepare(surfaces, ctx.camera);
        let result = self.buckets.draw_ordered(ctx);
        self.buckets.clear();
        result?;

        log::trace!(
            "{} pass: {} drawn, {} culled",
            ctx.pass,
            stats.drawn(),
            stats.culled
        );
        Ok(stats)
    }
}
