//! Renders a small lake scene offscreen and logs what each frame drew.
//!
//! Usage: `tarn-headless [settings.toml] [frames]`

use anyhow::Context;
use tarn::gfx::scene::actor::shadowed_sun;
use tarn::prelude::*;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn load_settings(path: Option<&String>) -> anyhow::Result<RenderSettings> {
    match path {
        Some(path) => RenderSettings::load(path).with_context(|| format!("loading {}", path)),
        None => Ok(RenderSettings::default()),
    }
}

fn build_scene(device: &mut WgpuBackend, settings: RenderSettings) -> anyhow::Result<Scene> {
    let cube = generate_cube();
    let cube_bounds = cube.bounds();
    let cube_mesh = device.upload_mesh("cube", &cube.to_mesh_data())?;
    let ground_mesh = device.upload_mesh("ground", &generate_plane(200.0, 200.0, 32, 16.0).to_mesh_data())?;
    let lake = generate_plane(40.0, 40.0, 1, 4.0);
    let lake_bounds = lake.bounds();
    let lake_mesh = device.upload_mesh("lake", &lake.to_mesh_data())?;
    let sky_mesh = device.upload_mesh("sky", &generate_skybox_cube().to_mesh_data())?;

    let checker: Vec<u8> = (0..64)
        .flat_map(|i| {
            if (i % 8 + i / 8) % 2 == 0 {
                [90, 140, 70, 255]
            } else {
                [70, 120, 55, 255]
            }
        })
        .collect();
    let grass = device.upload_texture_rgba("grass", &checker, 8, 8)?;

    let catalog = device.catalog();
    let programs = SurfacePrograms::from_catalog(catalog)?;
    let surface_program = catalog.program("surface")?;

    let mut scene = Scene::new(settings)?.with_fog(Fog::new(Vector3::new(0.6, 0.7, 0.8), 80.0, 400.0));

    scene.add_actor(
        SurfaceActor::new(ActorState::new("sky"))
            .with_surface(SkyboxSurface::new(sky_mesh, surface_program)),
    );
    scene.add_actor(
        SurfaceActor::new(
            ActorState::new("ground").with_transform(Transform::from_position(Vector3::new(0.0, -1.0, 0.0))),
        )
        .with_surface(TerrainSurface::new(ground_mesh, programs).with_texture(grass, 16.0)),
    );
    scene.add_actor(
        SurfaceActor::new(ActorState::new("lake")).with_surface(WaterSurface::new(
            lake_mesh,
            lake_bounds,
            surface_program,
        )),
    );
    for (i, x) in [-6.0, 0.0, 6.0].into_iter().enumerate() {
        let transform = Transform::from_position(Vector3::new(x, 1.0, -12.0 - 4.0 * i as f32))
            .with_rotation(Quaternion::from_angle_y(Deg(30.0 * i as f32)))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        scene.add_actor(
            SurfaceActor::new(ActorState::new(&format!("rock {}", i)).with_transform(transform))
                .with_surface(MeshSurface::new(cube_mesh, cube_bounds, programs)),
        );
    }

    scene.add_actor(LightActor::new(ActorState::new("ambient"), AmbientLight::new([0.25; 3])));
    let shadow_settings = scene.settings().shadow.clone();
    scene.add_actor(shadowed_sun(
        "sun",
        Vector3::new(-0.4, -1.0, -0.3),
        device,
        &shadow_settings,
    )?);
    scene.add_actor(LightActor::new(
        ActorState::new("lantern").with_transform(Transform::from_position(Vector3::new(0.0, 3.0, -8.0))),
        PointLight::new([1.0, 0.8, 0.5], 12.0).with_falloff(2.0),
    ));

    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    tarn::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let settings = load_settings(args.get(1))?;
    let frames: u32 = match args.get(2) {
        Some(frames) => frames.parse().context("frame count must be a number")?,
        None => 3,
    };

    let mut device = WgpuBackend::new_headless(WIDTH, HEIGHT).context("creating the wgpu backend")?;
    let scene = build_scene(&mut device, settings)?;
    log::info!("Scene has {} actors", scene.actor_count());

    let mut camera = Camera::perspective(Deg(60.0_f32), WIDTH as f32 / HEIGHT as f32, 0.1, 1000.0)?;
    let delta = 1.0 / 60.0;
    for frame_index in 0..frames {
        let elapsed = frame_index as f32 * delta;
        let eye = Point3::new(12.0 * (elapsed * 0.5).sin(), 4.0, 14.0);
        camera.set_transform_by_look_target(eye, Vector3::unit_y(), Point3::new(0.0, 0.0, -8.0))?;

        let time = FrameTime::new(elapsed, delta);
        let mut frame = scene.pre_draw(time, &mut camera, &mut device)?;
        let stats = scene.draw(&mut frame, time, &camera, DrawPass::Normal, &mut device)?;
        device.submit_offscreen()?;

        log::info!(
            "Frame {}: drew {} of {} surfaces ({} culled)",
            frame_index,
            stats.drawn(),
            stats.considered,
            stats.culled
        );
    }

    let pipelines = device.pipeline_stats();
    log::info!(
        "Done: {} pipelines across {} programs",
        pipelines.total_pipelines,
        pipelines.loaded_programs
    );
    Ok(())
}
