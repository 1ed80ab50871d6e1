use cgmath::{Point3, Vector3};

use crate::config::{Fog, RenderSettings};
use crate::error::{RenderError, Result};
use crate::gfx::camera::Camera;
use crate::gfx::geometry::Aabb;
use crate::gfx::rendering::device::{GraphicsDevice, RenderTarget};
use crate::gfx::rendering::surface_drawer::{DrawStats, SurfaceDrawer};
use crate::gfx::surface::{
    DrawContext, DrawPass, FrameInputs, FrameTime, PreDrawContext, Surface, SurfaceInstance,
};

use super::actor::Actor;
use super::light::{Light, LightCache};

/// Stable identifier handed out by [`Scene::add_actor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

/// Actors plus the settings used to draw them
pub struct Scene {
    actors: Vec<(ActorId, Box<dyn Actor>)>,
    next_id: u64,
    pub fog: Fog,
    /// Surfaces with finite bounds outside this box are never cached
    pub draw_bounds: Aabb,
    settings: RenderSettings,
}

impl Scene {
    /// Empty scene drawn with `settings`; fails when they do not validate
    pub fn new(settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_valid_settings(settings))
    }

    fn with_valid_settings(settings: RenderSettings) -> Self {
        Self {
            actors: Vec::new(),
            next_id: 0,
            fog: Fog::default(),
            draw_bounds: Aabb::from_center(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0e4, 1.0e4, 1.0e4),
            ),
            settings,
        }
    }

    pub fn with_draw_bounds(mut self, draw_bounds: Aabb) -> Self {
        self.draw_bounds = draw_bounds;
        self
    }

    pub fn with_fog(mut self, fog: Fog) -> Self {
        self.fog = fog;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn add_actor(&mut self, actor: impl Actor + 'static) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        log::debug!("Added actor '{}' as {:?}", actor.state().name, id);
        self.actors.push((id, Box::new(actor)));
        id
    }

    /// Removes an actor and releases its GPU resources; false when `id` is unknown
    pub fn remove_actor(&mut self, id: ActorId, device: &mut dyn GraphicsDevice) -> bool {
        let Some(index) = self.actors.iter().position(|(actor_id, _)| *actor_id == id) else {
            return false;
        };
        let (_, mut actor) = self.actors.remove(index);
        actor.release(device);
        log::debug!("Removed actor '{}'", actor.state().name);
        true
    }

    pub fn actor(&self, id: ActorId) -> Option<&dyn Actor> {
        self.actors
            .iter()
            .find(|(actor_id, _)| *actor_id == id)
            .map(|(_, actor)| &**actor)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut (dyn Actor + 'static)> {
        self.actors
            .iter_mut()
            .find(|(actor_id, _)| *actor_id == id)
            .map(|(_, actor)| &mut **actor)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Turns shadowing on or off for a directional light actor
    pub fn set_shadow_enabled(
        &mut self,
        id: ActorId,
        enabled: bool,
        device: &mut dyn GraphicsDevice,
    ) -> Result<()> {
        let shadow_settings = &self.settings.shadow;
        let actor = self
            .actors
            .iter_mut()
            .find(|(actor_id, _)| *actor_id == id)
            .map(|(_, actor)| actor)
            .ok_or_else(|| RenderError::InvalidArgument(format!("no actor {:?}", id)))?;

        match actor.light_mut() {
            Some(Light::Directional(light)) => {
                light.set_shadow_enabled(enabled, device, shadow_settings)
            }
            _ => Err(RenderError::InvalidArgument(format!(
                "actor {:?} is not a directional light",
                id
            ))),
        }
    }

    /// Caches this frame's actors, lights and surfaces and runs every offscreen pass
    ///
    /// The returned context must be handed to [`Scene::draw`] before the next
    /// call. `camera` is refreshed for the current backbuffer; passes may re-aim
    /// it internally but leave it as they found it.
    pub fn pre_draw<'a>(
        &'a self,
        time: FrameTime,
        camera: &mut Camera,
        device: &mut dyn GraphicsDevice,
    ) -> Result<FrameContext<'a>> {
        let (width, height) = device.backbuffer_size();
        camera.refresh(width, height);

        let mut frame = FrameContext::default();
        frame.actors.extend(
            self.actors
                .iter()
                .map(|(_, actor)| &**actor)
                .filter(|actor| actor.state().is_active()),
        );

        for &actor in &frame.actors {
            if let Some(light) = actor.light() {
                frame.lights.insert(light, &actor.world_transform());
            }
        }

        let mut collected: Vec<&dyn Surface> = Vec::new();
        for &actor in &frame.actors {
            actor.collect_surfaces(&mut collected);
            for surface in collected.drain(..) {
                let instance = SurfaceInstance::new(actor, surface);
                if instance.is_boundless() || instance.bounding_box().intersects(&self.draw_bounds) {
                    frame.surfaces.push(instance);
                }
            }
        }

        log::trace!(
            "Cached {} actors, {} surfaces, {} lights",
            frame.actors.len(),
            frame.surfaces.len(),
            frame.lights.len()
        );

        let inputs = FrameInputs {
            time,
            surfaces: &frame.surfaces,
            lights: &frame.lights,
            fog: &self.fog,
            settings: &self.settings,
        };

        for light in frame.lights.directional() {
            if light.shadow_enabled() {
                light
                    .shadow_pass()
                    .draw(light.direction(), camera, inputs, device)?;
            }
        }

        let mut ctx = PreDrawContext {
            inputs,
            camera,
            device,
        };
        for instance in &frame.surfaces {
            instance.pre_draw(&mut ctx)?;
        }

        Ok(frame)
    }

    /// Draws the cached surfaces to the backbuffer, then empties `frame`
    pub fn draw(
        &self,
        frame: &mut FrameContext<'_>,
        time: FrameTime,
        camera: &Camera,
        pass: DrawPass,
        device: &mut dyn GraphicsDevice,
    ) -> Result<DrawStats> {
        device.set_render_target(RenderTarget::Backbuffer)?;
        device.clear(self.settings.clear_color)?;

        let result = {
            let inputs = FrameInputs {
                time,
                surfaces: &frame.surfaces,
                lights: &frame.lights,
                fog: &self.fog,
                settings: &self.settings,
            };
            let mut ctx = DrawContext::new(inputs, camera, pass, device);
            let mut drawer = SurfaceDrawer::new(self.settings.sort_opaque_near_to_far);
            drawer.draw(inputs.surfaces, &mut ctx)
        };

        frame.clear();
        result
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_valid_settings(RenderSettings::default())
    }
}

/// Caches of one frame, alive from [`Scene::pre_draw`] until [`Scene::draw`]
#[derive(Default)]
pub struct FrameContext<'a> {
    actors: Vec<&'a dyn Actor>,
    surfaces: Vec<SurfaceInstance<'a>>,
    lights: LightCache<'a>,
}

impl<'a> FrameContext<'a> {
    pub fn actors(&self) -> &[&'a dyn Actor] {
        &self.actors
    }

    pub fn surfaces(&self) -> &[SurfaceInstance<'a>] {
        &self.surfaces
    }

    pub fn lights(&self) -> &LightCache<'a> {
        &self.lights
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.surfaces.is_empty() && self.lights.is_empty()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.lights.clear();
        self.actors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use crate::gfx::rendering::command_list::{CommandList, RenderCommand};
    use crate::gfx::rendering::device::{MeshHandle, ProgramHandle};
    use crate::gfx::scene::actor::{shadowed_sun, ActorState, LightActor, SurfaceActor, Transform};
    use crate::gfx::scene::light::{AmbientLight, DirectionalLight};
    use crate::gfx::surface::{
        DrawProperties, DrawStyle, MeshSurface, SurfacePrograms, SurfaceProperties, WaterSurface,
    };

    fn programs() -> SurfacePrograms {
        SurfacePrograms {
            normal: ProgramHandle(0),
            shadow: ProgramHandle(1),
        }
    }

    fn unit_box() -> Aabb {
        Aabb::from_center(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5))
    }

    fn mesh_actor(mesh: u32, position: Vector3<f32>, properties: Option<SurfaceProperties>) -> SurfaceActor {
        let mut surface = MeshSurface::new(MeshHandle(mesh), unit_box(), programs());
        if let Some(properties) = properties {
            surface = surface.with_properties(properties);
        }
        SurfaceActor::new(
            ActorState::new(&format!("mesh {}", mesh))
                .with_transform(Transform::from_position(position)),
        )
        .with_surface(surface)
    }

    fn water_actor(mesh: u32, height: f32) -> SurfaceActor {
        let flat = Aabb::new(Point3::new(-20.0, 0.0, -20.0), Point3::new(20.0, 0.0, 20.0));
        SurfaceActor::new(
            ActorState::new("water")
                .with_transform(Transform::from_position(Vector3::new(0.0, height, 0.0))),
        )
        .with_surface(WaterSurface::new(MeshHandle(mesh), flat, ProgramHandle(0)))
    }

    /// Perspective camera at the origin looking down -z
    fn viewer() -> Camera {
        let mut camera = Camera::perspective(Deg(60.0_f32), 1.0, 0.1, 100.0).unwrap();
        camera
            .set_transform_by_look_forward(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::unit_y(),
                -Vector3::unit_z(),
            )
            .unwrap();
        camera
    }

    fn run_frame(scene: &Scene, camera: &mut Camera, device: &mut CommandList) -> DrawStats {
        crate::logging::init_for_tests();
        let time = FrameTime::new(1.0, 0.016);
        let mut frame = scene.pre_draw(time, camera, device).unwrap();
        let stats = scene
            .draw(&mut frame, time, camera, DrawPass::Normal, device)
            .unwrap();
        assert!(frame.is_empty());
        stats
    }

    fn backbuffer_meshes(device: &CommandList) -> Vec<u32> {
        device
            .draws_into(RenderTarget::Backbuffer)
            .into_iter()
            .filter(|call| call.pass == DrawPass::Normal)
            .map(|call| call.mesh.0)
            .collect()
    }

    #[test]
    fn test_cull_end_to_end() {
        let mut scene = Scene::default();
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));
        scene.add_actor(mesh_actor(2, Vector3::new(0.0, 0.0, 10.0), None));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        let stats = run_frame(&scene, &mut camera, &mut device);

        assert_eq!(backbuffer_meshes(&device), vec![1]);
        assert_eq!(stats.considered, 2);
        assert_eq!(stats.culled, 1);
    }

    #[test]
    fn test_transparent_far_to_near() {
        let glass = SurfaceProperties::new(DrawStyle::Transparent);
        let mut scene = Scene::default();
        scene.add_actor(mesh_actor(100, Vector3::new(0.0, 0.0, -10.0), Some(glass.clone())));
        scene.add_actor(mesh_actor(400, Vector3::new(0.0, 0.0, -20.0), Some(glass)));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        assert_eq!(backbuffer_meshes(&device), vec![400, 100]);
    }

    #[test]
    fn test_transparent_ties_break_on_cull_mode() {
        let mut scene = Scene::default();
        let at = Vector3::new(0.0, 0.0, -10.0);
        let ccw = SurfaceProperties::new(DrawStyle::Transparent);
        let none = ccw.clone().with_cull_mode(crate::gfx::surface::CullMode::None);
        scene.add_actor(mesh_actor(1, at, Some(ccw)));
        scene.add_actor(mesh_actor(2, at, Some(none)));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        assert_eq!(backbuffer_meshes(&device), vec![2, 1]);
    }

    #[test]
    fn test_prioritized_ascending_then_opaque_then_transparent() {
        let mut priorities: Vec<i32> = (0..12).collect();
        priorities.shuffle(&mut StdRng::seed_from_u64(42));

        let mut scene = Scene::default();
        scene.add_actor(mesh_actor(
            500,
            Vector3::new(0.0, 0.0, -10.0),
            Some(SurfaceProperties::new(DrawStyle::Transparent)),
        ));
        scene.add_actor(mesh_actor(400, Vector3::new(0.0, 0.0, -12.0), None));
        for priority in &priorities {
            let props = SurfaceProperties::new(DrawStyle::Prioritized).with_priority(*priority);
            scene.add_actor(mesh_actor(*priority as u32, Vector3::new(0.0, 0.0, -5.0), Some(props)));
        }

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        let mut expected: Vec<u32> = (0..12).collect();
        expected.extend([400, 500]);
        assert_eq!(backbuffer_meshes(&device), expected);
    }

    #[test]
    fn test_frame_caches_do_not_leak() {
        let mut scene = Scene::default();
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));
        let hidden = scene.add_actor(mesh_actor(2, Vector3::new(1.0, 0.0, -10.0), None));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        scene.actor_mut(hidden).unwrap().state_mut().visible = false;
        device.clear_commands();

        let time = FrameTime::default();
        let mut frame = scene.pre_draw(time, &mut camera, &mut device).unwrap();
        assert_eq!(frame.actors().len(), 1);
        assert_eq!(frame.surfaces().len(), 1);
        scene
            .draw(&mut frame, time, &camera, DrawPass::Normal, &mut device)
            .unwrap();
        assert!(frame.is_empty());
        assert_eq!(backbuffer_meshes(&device), vec![1]);
    }

    #[test]
    fn test_draw_bounds_drop_surfaces() {
        let mut scene = Scene::default().with_draw_bounds(Aabb::new(
            Point3::new(-5.0, -5.0, -15.0),
            Point3::new(5.0, 5.0, 0.0),
        ));
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));
        scene.add_actor(mesh_actor(2, Vector3::new(0.0, 0.0, -50.0), None));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        let frame = scene
            .pre_draw(FrameTime::default(), &mut camera, &mut device)
            .unwrap();
        assert_eq!(frame.actors().len(), 2);
        assert_eq!(frame.surfaces().len(), 1);
    }

    #[test]
    fn test_disabled_shadow_never_published() {
        let mut scene = Scene::default();
        let sun = DirectionalLight::new(-Vector3::unit_y(), [1.0; 3], [1.0; 3]).unwrap();
        let sun_id = scene.add_actor(LightActor::new(ActorState::new("sun"), sun));
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        for _ in 0..3 {
            let time = FrameTime::default();
            let mut frame = scene.pre_draw(time, &mut camera, &mut device).unwrap();
            assert!(frame.lights().shadow_map().is_none());
            scene
                .draw(&mut frame, time, &camera, DrawPass::Normal, &mut device)
                .unwrap();
        }

        let Some(Light::Directional(light)) = scene.actor_mut(sun_id).unwrap().light_mut() else {
            panic!("sun is a directional light");
        };
        assert!(light.shadow_map().is_none());
        assert_eq!(device.live_target_count(), 0);
        assert!(device.draws().iter().all(|draw| draw.call.shadow.is_none()));
    }

    #[test]
    fn test_shadow_map_published_and_sampled() {
        let mut device = CommandList::new(640, 480);
        let mut scene = Scene::default();
        let sun = shadowed_sun("sun", -Vector3::unit_y(), &mut device, &scene.settings().shadow)
            .unwrap();
        scene.add_actor(sun);
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));

        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        let draws = device.draws();
        let caster = draws
            .iter()
            .find(|draw| draw.call.pass == DrawPass::DirectionalShadow)
            .unwrap();
        assert!(matches!(caster.target, RenderTarget::Offscreen(_)));
        assert_eq!(caster.call.program, ProgramHandle(1));

        let lit = draws
            .iter()
            .find(|draw| draw.target == RenderTarget::Backbuffer)
            .unwrap();
        let map = lit.call.shadow.unwrap();
        assert!(device
            .commands()
            .iter()
            .any(|c| matches!(c, RenderCommand::Resolve { texture, .. } if *texture == map.texture)));
    }

    #[test]
    fn test_offscreen_work_precedes_backbuffer() {
        let mut device = CommandList::new(640, 480);
        let mut scene = Scene::default();
        let sun = shadowed_sun("sun", -Vector3::unit_y(), &mut device, &scene.settings().shadow)
            .unwrap();
        scene.add_actor(sun);
        scene.add_actor(water_actor(7, -2.0));
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));

        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        let first_backbuffer = device.first_backbuffer_bind().unwrap();
        for (index, command) in device.commands().iter().enumerate() {
            match command {
                RenderCommand::SetTarget(RenderTarget::Offscreen(_))
                | RenderCommand::Resolve { .. }
                | RenderCommand::SetClipPlane(_) => assert!(index < first_backbuffer),
                _ => {}
            }
        }
        let binds = device
            .commands()
            .iter()
            .filter(|c| **c == RenderCommand::SetTarget(RenderTarget::Backbuffer))
            .count();
        assert_eq!(binds, 1);

        let water = device
            .draws_into(RenderTarget::Backbuffer)
            .into_iter()
            .find(|call| call.mesh == MeshHandle(7))
            .unwrap();
        assert!(water.reflection.is_some());
    }

    #[test]
    fn test_remove_actor_releases_targets() {
        let mut device = CommandList::new(640, 480);
        let mut scene = Scene::default();
        let sun = shadowed_sun("sun", -Vector3::unit_y(), &mut device, &scene.settings().shadow)
            .unwrap();
        let sun_id = scene.add_actor(sun);
        let water_id = scene.add_actor(water_actor(7, -2.0));

        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);
        assert_eq!(device.live_target_count(), 2);

        assert!(scene.remove_actor(water_id, &mut device));
        assert!(scene.remove_actor(sun_id, &mut device));
        assert!(!scene.remove_actor(sun_id, &mut device));
        assert_eq!(device.live_target_count(), 0);
        assert_eq!(scene.actor_count(), 0);
    }

    #[test]
    fn test_set_shadow_enabled_requires_directional_light() {
        let mut device = CommandList::new(64, 64);
        let mut scene = Scene::default();
        let mesh = scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, 0.0), None));
        let sun = DirectionalLight::new(-Vector3::unit_y(), [1.0; 3], [1.0; 3]).unwrap();
        let sun = scene.add_actor(LightActor::new(ActorState::new("sun"), sun));

        assert!(scene.set_shadow_enabled(mesh, true, &mut device).is_err());
        scene.set_shadow_enabled(sun, true, &mut device).unwrap();
        assert_eq!(device.live_target_count(), 1);
    }

    #[test]
    fn test_shadow_casters_need_flag_and_visibility() {
        let mut device = CommandList::new(640, 480);
        let mut scene = Scene::default();
        let sun = shadowed_sun("sun", -Vector3::unit_y(), &mut device, &scene.settings().shadow)
            .unwrap();
        scene.add_actor(sun);
        scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));
        let no_shadow = SurfaceProperties::new(DrawStyle::Opaque)
            .with_draw_properties(DrawProperties::REFLECTING);
        scene.add_actor(mesh_actor(2, Vector3::new(0.0, 0.0, -12.0), Some(no_shadow)));
        // The shadow camera covers 100x100 units around the viewer
        scene.add_actor(mesh_actor(3, Vector3::new(200.0, 0.0, -10.0), None));

        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        let casters: Vec<u32> = device
            .draws()
            .iter()
            .filter(|draw| draw.call.pass == DrawPass::DirectionalShadow)
            .map(|draw| draw.call.mesh.0)
            .collect();
        assert_eq!(casters, vec![1]);

        let mut lit = backbuffer_meshes(&device);
        lit.sort();
        assert_eq!(lit, vec![1, 2]);
    }

    #[test]
    fn test_unsorted_opaques_stay_between_buckets() {
        let settings = RenderSettings::default().with_opaque_sorting(false);
        let mut scene = Scene::new(settings).unwrap();
        scene.add_actor(mesh_actor(
            50,
            Vector3::new(0.0, 0.0, -15.0),
            Some(SurfaceProperties::new(DrawStyle::Transparent)),
        ));
        for (mesh, depth) in [(30, -30.0), (10, -10.0), (20, -20.0)] {
            scene.add_actor(mesh_actor(mesh, Vector3::new(0.0, 0.0, depth), None));
        }
        scene.add_actor(mesh_actor(
            0,
            Vector3::new(0.0, 0.0, -5.0),
            Some(SurfaceProperties::new(DrawStyle::Prioritized)),
        ));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        let stats = run_frame(&scene, &mut camera, &mut device);
        assert_eq!(stats.prioritized, 1);
        assert_eq!(stats.opaque, 3);
        assert_eq!(stats.transparent, 1);

        let drawn = backbuffer_meshes(&device);
        assert_eq!(drawn.len(), 5);
        assert_eq!(drawn[0], 0);
        assert_eq!(drawn[4], 50);
        let mut opaque = drawn[1..4].to_vec();
        opaque.sort();
        assert_eq!(opaque, vec![10, 20, 30]);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let shadow = crate::config::ShadowSettings::default().with_depth_range(10.0, 1.0);
        let settings = RenderSettings::default().with_shadow(shadow);
        assert!(matches!(
            Scene::new(settings.clone()),
            Err(RenderError::InvalidArgument(_))
        ));

        let mut scene = Scene::default();
        assert!(scene.set_settings(settings).is_err());
        assert_eq!(scene.settings(), &RenderSettings::default());
    }

    #[test]
    fn test_empty_actor_set_leaves_empty_caches() {
        let mut scene = Scene::default();
        let mesh = scene.add_actor(mesh_actor(1, Vector3::new(0.0, 0.0, -10.0), None));
        let ambient = scene.add_actor(LightActor::new(
            ActorState::new("ambient"),
            AmbientLight::new([0.2; 3]),
        ));

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        run_frame(&scene, &mut camera, &mut device);

        assert!(scene.remove_actor(mesh, &mut device));
        assert!(scene.remove_actor(ambient, &mut device));
        device.clear_commands();

        let time = FrameTime::default();
        let mut frame = scene.pre_draw(time, &mut camera, &mut device).unwrap();
        assert!(frame.is_empty());
        assert!(frame.lights().ambient().is_empty());
        let stats = scene
            .draw(&mut frame, time, &camera, DrawPass::Normal, &mut device)
            .unwrap();
        assert_eq!(stats.drawn(), 0);
        assert!(frame.is_empty());
        assert!(device.draws().is_empty());
    }
}
