//! Bevy side of the penguin meadow.
//!
//! [`MeadowScenePlugin`] builds a [`SceneContext`] for the primary window,
//! spawns penguins, flowers and the ground from it, and every frame copies the
//! freshly computed poses into `Transform`s.

pub mod mesh;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use penguin_meadow::MeadowConfig;
use penguin_meadow::scene::animator::{FAR, FLOWER_BASE_Y, FOV_Y_DEGREES, NEAR};
use penguin_meadow::scene::layout::{GROUND_SEGMENTS, GROUND_SIZE};
use penguin_meadow::scene::{FlowerLook, SceneContext, SurfaceSize};

pub const SKY: u32 = 0x87ceeb;
const GRASS: u32 = 0x4a7c3a;
const LEAF: u32 = 0x228b22;
const FLOWER_CENTRE: u32 = 0xffff00;
const ORANGE: u32 = 0xffa500;

pub const FOG_START: f32 = 50.0;
pub const FOG_END: f32 = 200.0;
const AMBIENT_BRIGHTNESS: f32 = 600.0;
const KEY_ILLUMINANCE: f32 = 8_000.0;
const SUNSET_ILLUMINANCE: f32 = 3_000.0;

pub const MIN_CAMERA_DISTANCE: f32 = 10.0;
pub const MAX_CAMERA_DISTANCE: f32 = 80.0;
/// Radians per second around the focus.
pub const AUTO_ROTATE_SPEED: f32 = 0.0524;

pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub struct MeadowScenePlugin {
    pub penguins: usize,
    pub flowers: usize,
    /// Fixed seed for reproducible layouts.
    pub seed: Option<u64>,
}

impl Default for MeadowScenePlugin {
    fn default() -> Self {
        Self::from_config(&MeadowConfig::default())
    }
}

impl MeadowScenePlugin {
    pub fn from_config(config: &MeadowConfig) -> Self {
        Self {
            penguins: config.penguin_count,
            flowers: config.flower_count,
            seed: None,
        }
    }
}

impl Plugin for MeadowScenePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PanOrbitCameraPlugin>() {
            app.add_plugins(PanOrbitCameraPlugin);
        }
        app.insert_resource(ClearColor(hex_color(SKY)))
            .insert_resource(AmbientLight {
                color: Color::WHITE,
                brightness: AMBIENT_BRIGHTNESS,
                ..default()
            })
            .insert_resource(MeadowSettings {
                penguins: self.penguins,
                flowers: self.flowers,
                seed: self.seed,
            })
            .add_systems(Startup, (setup_lights_and_camera, spawn_meadow))
            .add_systems(Update, (animate_meadow, track_resize, auto_rotate_camera));
    }
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct MeadowSettings {
    pub penguins: usize,
    pub flowers: usize,
    pub seed: Option<u64>,
}

/// The live scene; absent when there was no window to draw into.
#[derive(Resource, Deref, DerefMut)]
pub struct MeadowScene(pub SceneContext);

#[derive(Component)]
pub struct MeadowCamera;

/// Index into [`SceneContext::penguins`].
#[derive(Component, Clone, Copy, Debug)]
pub struct MeadowPenguin(pub usize);

/// Index into [`SceneContext::flowers`].
#[derive(Component, Clone, Copy, Debug)]
pub struct MeadowFlower(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct Flipper {
    pub penguin: usize,
    pub side: Side,
}

fn setup_lights_and_camera(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: KEY_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(50.0, 50.0, 25.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("key_light"),
    ));

    commands.spawn((
        DirectionalLight {
            color: hex_color(ORANGE),
            illuminance: SUNSET_ILLUMINANCE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-30.0, 20.0, -30.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("sunset_light"),
    ));

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_Y_DEGREES.to_radians(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        Transform::from_xyz(0.0, 15.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
        PanOrbitCamera {
            focus: Vec3::ZERO,
            zoom_lower_limit: MIN_CAMERA_DISTANCE,
            zoom_upper_limit: Some(MAX_CAMERA_DISTANCE),
            // Stay above the horizon.
            pitch_lower_limit: Some(0.0),
            pitch_upper_limit: Some(FRAC_PI_2 - 0.01),
            ..default()
        },
        DistanceFog {
            color: hex_color(SKY),
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
        MeadowCamera,
        Name::new("meadow_camera"),
    ));
}

fn spawn_meadow(
    mut commands: Commands,
    settings: Res<MeadowSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let surface = windows
        .single()
        .ok()
        .map(|w| SurfaceSize::new(w.width(), w.height()));
    let mut rng = settings
        .seed
        .map(fastrand::Rng::with_seed)
        .unwrap_or_else(fastrand::Rng::new);

    let Some(scene) =
        SceneContext::initialize(surface, settings.penguins, settings.flowers, &mut rng)
    else {
        warn!("meadow: no drawable window, scene not created");
        return;
    };

    commands.spawn((
        Mesh3d(meshes.add(mesh::ground_mesh(
            scene.ground_heights(),
            GROUND_SEGMENTS,
            GROUND_SIZE,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: hex_color(GRASS),
            perceptual_roughness: 0.8,
            metallic: 0.2,
            ..default()
        })),
        Transform::default(),
        Name::new("ground"),
    ));

    let kit = PenguinKit::new(&mut meshes, &mut materials);
    for (index, penguin) in scene.penguins().iter().enumerate() {
        kit.spawn(&mut commands, index, penguin.base);
    }

    let parts = FlowerParts::new(&mut meshes, &mut materials);
    for (index, flower) in scene.flowers().iter().enumerate() {
        parts.spawn(&mut commands, &mut materials, index, flower.base, flower.look);
    }

    info!(
        "meadow: spawned {} penguins and {} flowers",
        scene.penguins().len(),
        scene.flowers().len()
    );
    commands.insert_resource(MeadowScene(scene));
}

/// Shared meshes and materials for every penguin.
struct PenguinKit {
    body: Handle<Mesh>,
    belly: Handle<Mesh>,
    head: Handle<Mesh>,
    face: Handle<Mesh>,
    beak: Handle<Mesh>,
    eye: Handle<Mesh>,
    pupil: Handle<Mesh>,
    flipper: Handle<Mesh>,
    foot: Handle<Mesh>,
    black: Handle<StandardMaterial>,
    white: Handle<StandardMaterial>,
    orange: Handle<StandardMaterial>,
}

impl PenguinKit {
    fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        Self {
            body: meshes.add(Sphere::new(1.0)),
            belly: meshes.add(Sphere::new(0.7)),
            head: meshes.add(Sphere::new(0.6)),
            face: meshes.add(Sphere::new(0.4)),
            beak: meshes.add(Cone::new(0.15, 0.4)),
            eye: meshes.add(Sphere::new(0.1)),
            pupil: meshes.add(Sphere::new(0.05)),
            flipper: meshes.add(Sphere::new(0.3)),
            foot: meshes.add(Sphere::new(0.25)),
            black: materials.add(StandardMaterial::from_color(Color::BLACK)),
            white: materials.add(StandardMaterial::from_color(Color::WHITE)),
            orange: materials.add(StandardMaterial::from_color(hex_color(ORANGE))),
        }
    }

    fn spawn(&self, commands: &mut Commands, index: usize, base: [f32; 2]) {
        let part = |mesh: &Handle<Mesh>, material: &Handle<StandardMaterial>, tf: Transform| {
            (Mesh3d(mesh.clone()), MeshMaterial3d(material.clone()), tf)
        };

        commands
            .spawn((
                Transform::from_xyz(base[0], 0.0, base[1]),
                Visibility::default(),
                MeadowPenguin(index),
                Name::new(format!("penguin_{index}")),
            ))
            .with_children(|p| {
                p.spawn(part(
                    &self.body,
                    &self.black,
                    Transform::from_scale(Vec3::new(1.0, 1.3, 0.9)),
                ));
                p.spawn(part(
                    &self.belly,
                    &self.white,
                    Transform::from_xyz(0.0, 0.0, 0.3).with_scale(Vec3::new(0.8, 1.1, 0.6)),
                ));
                p.spawn(part(&self.head, &self.black, Transform::from_xyz(0.0, 1.5, 0.0)));
                p.spawn(part(
                    &self.face,
                    &self.white,
                    Transform::from_xyz(0.0, 1.5, 0.35).with_scale(Vec3::new(0.9, 1.0, 0.6)),
                ));
                p.spawn(part(
                    &self.beak,
                    &self.orange,
                    Transform::from_xyz(0.0, 1.5, 0.7)
                        .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                ));
                for x in [-0.2, 0.2] {
                    p.spawn(part(&self.eye, &self.white, Transform::from_xyz(x, 1.6, 0.5)));
                    p.spawn(part(&self.pupil, &self.black, Transform::from_xyz(x, 1.6, 0.58)));
                }
                for (side, x, rest) in [(Side::Left, -0.9, -0.3), (Side::Right, 0.9, 0.3)] {
                    p.spawn((
                        part(
                            &self.flipper,
                            &self.black,
                            Transform::from_xyz(x, 0.3, 0.0)
                                .with_rotation(Quat::from_rotation_z(rest))
                                .with_scale(Vec3::new(0.3, 1.0, 0.5)),
                        ),
                        Flipper {
                            penguin: index,
                            side,
                        },
                    ));
                }
                for x in [-0.4, 0.4] {
                    p.spawn(part(
                        &self.foot,
                        &self.orange,
                        Transform::from_xyz(x, -1.2, 0.2).with_scale(Vec3::new(1.2, 0.4, 1.5)),
                    ));
                }
            });
    }
}

struct FlowerParts {
    stem: Handle<Mesh>,
    centre: Handle<Mesh>,
    petal: Handle<Mesh>,
    leaf: Handle<Mesh>,
    green: Handle<StandardMaterial>,
    yellow: Handle<StandardMaterial>,
}

impl FlowerParts {
    fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        Self {
            stem: meshes.add(Cylinder::new(0.05, 1.5)),
            centre: meshes.add(Sphere::new(0.2)),
            petal: meshes.add(Sphere::new(0.25)),
            leaf: meshes.add(Sphere::new(0.15)),
            green: materials.add(StandardMaterial::from_color(hex_color(LEAF))),
            yellow: materials.add(StandardMaterial::from_color(hex_color(FLOWER_CENTRE))),
        }
    }

    fn spawn(
        &self,
        commands: &mut Commands,
        materials: &mut Assets<StandardMaterial>,
        index: usize,
        base: [f32; 2],
        look: FlowerLook,
    ) {
        let petal_material = materials.add(StandardMaterial::from_color(hex_color(look.petal_color)));
        commands
            .spawn((
                Transform::from_xyz(base[0], FLOWER_BASE_Y, base[1])
                    .with_scale(Vec3::splat(look.scale)),
                Visibility::default(),
                MeadowFlower(index),
                Name::new(format!("flower_{index}")),
            ))
            .with_children(|f| {
                f.spawn((
                    Mesh3d(self.stem.clone()),
                    MeshMaterial3d(self.green.clone()),
                    Transform::default(),
                ));
                f.spawn((
                    Mesh3d(self.centre.clone()),
                    MeshMaterial3d(self.yellow.clone()),
                    Transform::from_xyz(0.0, 0.75, 0.0),
                ));
                for i in 0..look.petal_count {
                    let angle = i as f32 / look.petal_count as f32 * TAU;
                    f.spawn((
                        Mesh3d(self.petal.clone()),
                        MeshMaterial3d(petal_material.clone()),
                        Transform::from_xyz(angle.cos() * 0.35, 0.75, angle.sin() * 0.35)
                            .with_scale(Vec3::new(1.0, 0.5, 1.0)),
                    ));
                }
                for i in 0..2 {
                    let angle = i as f32 * std::f32::consts::PI;
                    f.spawn((
                        Mesh3d(self.leaf.clone()),
                        MeshMaterial3d(self.green.clone()),
                        Transform::from_xyz(angle.cos() * 0.3, 0.3, angle.sin() * 0.3)
                            .with_rotation(Quat::from_rotation_z(FRAC_PI_4))
                            .with_scale(Vec3::new(1.5, 0.3, 0.8)),
                    ));
                }
            });
    }
}

/// Copy this frame's poses into the spawned entities.
pub fn animate_meadow(
    time: Res<Time>,
    scene: Option<ResMut<MeadowScene>>,
    mut penguins: Query<(&MeadowPenguin, &mut Transform), (Without<Flipper>, Without<MeadowFlower>)>,
    mut flippers: Query<(&Flipper, &mut Transform), (Without<MeadowPenguin>, Without<MeadowFlower>)>,
    mut flowers: Query<(&MeadowFlower, &mut Transform), (Without<MeadowPenguin>, Without<Flipper>)>,
) {
    let Some(mut scene) = scene else {
        return;
    };
    let stats = scene.tick(time.elapsed_secs_f64());
    if stats.held > 0 {
        debug!("meadow: {} objects kept last frame's pose", stats.held);
    }

    for (&MeadowPenguin(index), mut tf) in &mut penguins {
        let Some(penguin) = scene.penguins().get(index) else {
            continue;
        };
        let pose = penguin.pose;
        tf.translation = Vec3::new(penguin.base[0], pose.height, penguin.base[1]);
        tf.rotation = Quat::from_euler(EulerRot::XYZ, pose.pitch, pose.yaw, 0.0);
    }

    for (flipper, mut tf) in &mut flippers {
        let Some(penguin) = scene.penguins().get(flipper.penguin) else {
            continue;
        };
        let angle = match flipper.side {
            Side::Left => penguin.pose.left_flipper,
            Side::Right => penguin.pose.right_flipper,
        };
        tf.rotation = Quat::from_rotation_z(angle);
    }

    for (&MeadowFlower(index), mut tf) in &mut flowers {
        if let Some(flower) = scene.flowers().get(index) {
            tf.rotation = Quat::from_rotation_z(flower.pose.roll);
        }
    }
}

fn track_resize(
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    scene: Option<ResMut<MeadowScene>>,
    mut cameras: Query<&mut Projection, With<MeadowCamera>>,
) {
    let (Some(mut scene), Ok(primary)) = (scene, primary.single()) else {
        resized.clear();
        return;
    };
    for event in resized.read() {
        if event.window != primary || !scene.on_resize(event.width, event.height) {
            continue;
        }
        let projection = scene.projection();
        for mut camera in &mut cameras {
            if let Projection::Perspective(perspective) = camera.as_mut() {
                perspective.aspect_ratio = projection.aspect;
                perspective.fov = projection.fov_y;
            }
        }
    }
}

fn auto_rotate_camera(time: Res<Time>, mut cameras: Query<&mut PanOrbitCamera, With<MeadowCamera>>) {
    for mut orbit in &mut cameras {
        orbit.target_yaw += AUTO_ROTATE_SPEED * time.delta_secs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_app(seed: u64) -> App {
        let mut rng = fastrand::Rng::with_seed(seed);
        let scene = SceneContext::initialize(Some(SurfaceSize::new(800.0, 600.0)), 2, 3, &mut rng)
            .expect("drawable surface");
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(MeadowScene(scene))
            .add_systems(Update, animate_meadow);
        app
    }

    #[test]
    fn hex_colors_decode() {
        assert_eq!(hex_color(SKY), Color::srgb_u8(0x87, 0xce, 0xeb));
    }

    #[test]
    fn animation_follows_the_scene() {
        let mut app = scene_app(3);
        let penguin = app
            .world_mut()
            .spawn((Transform::default(), MeadowPenguin(1)))
            .id();
        let left = app
            .world_mut()
            .spawn((
                Transform::default(),
                Flipper {
                    penguin: 1,
                    side: Side::Left,
                },
            ))
            .id();
        let flower = app
            .world_mut()
            .spawn((Transform::default(), MeadowFlower(2)))
            .id();

        app.update();

        let scene = app.world().resource::<MeadowScene>();
        let p = &scene.penguins()[1];
        let f = &scene.flowers()[2];
        let (pose, base, roll) = (p.pose, p.base, f.pose.roll);

        let tf = app.world().get::<Transform>(penguin).unwrap();
        assert_eq!(tf.translation, Vec3::new(base[0], pose.height, base[1]));
        assert!(tf.translation.y >= 1.3 - 1e-5);

        let tf = app.world().get::<Transform>(left).unwrap();
        assert_eq!(tf.rotation, Quat::from_rotation_z(pose.left_flipper));

        let tf = app.world().get::<Transform>(flower).unwrap();
        assert_eq!(tf.rotation, Quat::from_rotation_z(roll));
    }

    fn resize_app() -> (App, Entity, Entity) {
        let mut app = scene_app(5);
        app.add_message::<WindowResized>()
            .add_systems(Update, track_resize);
        let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
        let camera = app
            .world_mut()
            .spawn((
                Projection::Perspective(PerspectiveProjection::default()),
                MeadowCamera,
            ))
            .id();
        (app, window, camera)
    }

    fn aspect(app: &App, camera: Entity) -> f32 {
        match app.world().get::<Projection>(camera) {
            Some(Projection::Perspective(p)) => p.aspect_ratio,
            other => panic!("expected a perspective camera, got {other:?}"),
        }
    }

    #[test]
    fn primary_window_resize_reaches_the_camera() {
        let (mut app, window, camera) = resize_app();
        app.world_mut().write_message(WindowResized {
            window,
            width: 1920.0,
            height: 1080.0,
        });
        app.update();

        assert_eq!(aspect(&app, camera), 1920.0 / 1080.0);
        assert_eq!(app.world().resource::<MeadowScene>().projection().aspect, 1920.0 / 1080.0);
        match app.world().get::<Projection>(camera) {
            Some(Projection::Perspective(p)) => assert_eq!(p.fov, FOV_Y_DEGREES.to_radians()),
            other => panic!("expected a perspective camera, got {other:?}"),
        }
    }

    #[test]
    fn other_windows_and_empty_sizes_are_ignored() {
        let (mut app, window, camera) = resize_app();
        let other = app.world_mut().spawn(Window::default()).id();
        app.world_mut().write_message(WindowResized {
            window: other,
            width: 300.0,
            height: 900.0,
        });
        app.world_mut().write_message(WindowResized {
            window,
            width: 0.0,
            height: 0.0,
        });
        app.update();

        assert_eq!(aspect(&app, camera), PerspectiveProjection::default().aspect_ratio);
        assert_eq!(app.world().resource::<MeadowScene>().projection().aspect, 800.0 / 600.0);
    }

    #[test]
    fn stray_indices_are_skipped() {
        let mut app = scene_app(4);
        let stray = app
            .world_mut()
            .spawn((Transform::default(), MeadowPenguin(99)))
            .id();
        app.update();
        assert_eq!(app.world().get::<Transform>(stray), Some(&Transform::default()));
    }

    #[test]
    fn nothing_happens_without_a_scene() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_systems(Update, animate_meadow);
        let e = app
            .world_mut()
            .spawn((Transform::default(), MeadowPenguin(0)))
            .id();
        app.update();
        assert_eq!(app.world().get::<Transform>(e), Some(&Transform::default()));
    }
}
