//! Tide Demo
//!
//! Builds the harbour scene (two ships riding the tide, seagulls circling
//! overhead, trees and rocks on the shore, a character on the beach) and
//! plays a short scripted session against a [`ManualClock`]. Draw calls go
//! to a sink that logs them, standing in for a GPU backend.
//!
//! Usage: `tide_demo [settings.json]`

use std::sync::Arc;

use anyhow::Context;
use glam::{Quat, Vec3};

use cove::animation::{AnimationClip, LoopMode, TransformTracks};
use cove::assets::{HeightField, MeshId};
use cove::clock::ManualClock;
use cove::config::ViewerSettings;
use cove::input::{InputEvent, Key};
use cove::math;
use cove::scene::presets::{self, Placement};
use cove::scene::{
    BoneDesc, CharacterController, DrawCall, DrawSink, Node, Skeleton, SkinnedMesh, StaticMesh,
};
use cove::viewer::Viewer;

const TERRAIN: MeshId = MeshId(0);
const WATER: MeshId = MeshId(1);
const SHIP_HULL: MeshId = MeshId(2);
const SHIP_SAIL: MeshId = MeshId(3);
const SEAGULL: MeshId = MeshId(4);
const CHARACTER: MeshId = MeshId(5);
const TREE: MeshId = MeshId(6);
const ROCK: MeshId = MeshId(7);

const FRAME_DT: f32 = 1.0 / 30.0;

/// Counts submissions and logs a summary of each one.
#[derive(Default)]
struct LoggingSink {
    calls: usize,
    skinned: usize,
}

impl DrawSink for LoggingSink {
    fn submit(&mut self, call: &DrawCall<'_>) {
        self.calls += 1;
        if let Some(bones) = call.skinning {
            self.skinned += 1;
            log::trace!(
                "draw {:?} at {} with {} bones",
                call.mesh,
                call.model.w_axis.truncate(),
                bones.len()
            );
        } else {
            log::trace!("draw {:?} at {}", call.mesh, call.model.w_axis.truncate());
        }
    }
}

/// Terrain sloping out of the water: flat beach at height zero for
/// `z < shore_z`, rising into rolling grass over the next 32 cells.
fn shore_terrain(shore_z: f32) -> anyhow::Result<HeightField> {
    const SIZE: usize = 256;
    let samples = (0..SIZE * SIZE)
        .map(|i| {
            let (x, z) = ((i / SIZE) as f32, (i % SIZE) as f32);
            let hills = 40.0 + 20.0 * (x / 24.0).sin() * (z / 32.0).cos();
            let rise = ((z - shore_z) / 32.0).clamp(0.0, 1.0);
            (hills * rise).clamp(0.0, 255.0) as u8
        })
        .collect();
    Ok(HeightField::from_samples(SIZE, SIZE, samples, 25.0)?)
}

/// Trees on the grass above the beach.
fn tree_placements() -> Vec<Placement> {
    (0..10_u16)
        .map(|i| {
            let x = f32::from((i * 53 + 17) % 256);
            let z = f32::from(160 + (i * 37) % 96);
            Placement::at(x, z)
        })
        .collect()
}

/// Small rocks tumbled along the beach strip.
fn rock_placements(shore_z: f32) -> Vec<Placement> {
    (0..20_u16)
        .map(|i| {
            let x = f32::from((i * 29 + 5) % 256);
            let z = shore_z + f32::from((i * 11) % 32);
            let angle = f32::from((i * 47) % 360);
            Placement::at(x, z)
                .with_rotation(math::quaternion_from_axis_angle(Vec3::X, angle))
                .with_scale(0.0025)
        })
        .collect()
}

/// Two-bone rig for the character with a looping wave.
fn character_rig() -> anyhow::Result<(Arc<Skeleton>, Arc<AnimationClip>)> {
    let skeleton = Skeleton::new(
        "character",
        vec![
            BoneDesc::new("hips", None, math::translate(0.0, 1.0, 0.0)),
            BoneDesc::new("arm", Some(0), math::translate(0.3, 0.5, 0.0)),
        ],
    )?;
    let arm = TransformTracks::from_keys(
        [(0.0, Vec3::new(0.3, 0.5, 0.0))],
        [
            (0.0, Quat::IDENTITY),
            (12.0, math::quaternion_from_axis_angle(Vec3::Z, 60.0)),
            (24.0, Quat::IDENTITY),
        ],
        [(0.0, 1.0)],
    )?;
    let clip = AnimationClip::new("wave", [("arm".to_string(), arm)], None, 24.0)
        .with_loop_mode(LoopMode::Repeat);
    skeleton.check_clip(&clip)?;
    Ok((Arc::new(skeleton), Arc::new(clip)))
}

fn build_scene(viewer: &mut Viewer) -> anyhow::Result<()> {
    let settings = viewer.settings().clone();
    let graph = &mut viewer.graph;

    let shore_z = settings.character.shore_z;
    let terrain = shore_terrain(shore_z)?;

    let base = graph.add_node(Node::new().named("base"));
    // Height-field coordinates, shifted so the grid centre sits at the origin.
    let ground = graph.insert_child(
        base,
        Node::with_transform(math::translate(-128.0, 0.0, -128.0))
            .named("ground")
            .with_payload(StaticMesh::new(TERRAIN)),
    );
    let tree = graph.create_node(Node::new().with_payload(StaticMesh::new(TREE)));
    presets::scatter_on_terrain(graph, Some(ground), "trees", tree, &terrain, &tree_placements());
    let rock = graph.create_node(Node::new().with_payload(StaticMesh::new(ROCK)));
    presets::scatter_on_terrain(graph, Some(ground), "rocks", rock, &terrain, &rock_placements(shore_z));
    graph.insert_child(
        base,
        Node::with_transform(math::translate(0.0, -1.0, 0.0) * math::scale(256.0, 1.0, 256.0))
            .with_payload(StaticMesh::new(WATER)),
    );

    // Both ships share one model subtree.
    let ship_model = graph.create_node(Node::new().named("ship_model"));
    graph.insert_child(ship_model, Node::new().with_payload(StaticMesh::new(SHIP_HULL)));
    graph.insert_child(
        ship_model,
        Node::with_transform(math::translate(0.0, 4.0, 0.0)).with_payload(StaticMesh::new(SHIP_SAIL)),
    );
    for (name, x, z, offset) in [("boat_east", 100.0, 84.0, 0.0), ("boat_west", -60.0, 90.0, 5.0)] {
        let tracks = presets::ship_bob_tracks(x, z, offset, 0.5)?;
        let ship = graph.insert_child(base, Node::looping(tracks).named(name));
        graph.add_child(ship, ship_model);
    }

    let seagull = graph.create_node(Node::new().with_payload(StaticMesh::new(SEAGULL)));
    let heights: Vec<f32> = (0..=presets::LOOP_KEYS)
        .map(|i| (f32::from(i) * 0.7).sin() * 1.5)
        .collect();
    presets::build_seagull_trio(graph, Some(base), seagull, Vec3::new(0.0, 60.0, 0.0), 80.0, &heights)?;
    let flock_center = Vec3::new(30.0, 75.0, -20.0);
    presets::build_seagull_formation(graph, Some(base), seagull, flock_center, 110.0, 3, &heights)?;

    let (skeleton, clip) = character_rig()?;
    let poses = ["idle", "run", "jump", "victory"].map(|name| {
        let mesh = SkinnedMesh::new(CHARACTER, Arc::clone(&skeleton)).with_clip(Arc::clone(&clip));
        Node::new().named(name).with_payload(mesh)
    });
    let character = CharacterController::spawn(graph, Some(base), poses, terrain, settings.character);
    log::info!("Character spawned at {}", character.position());
    viewer.set_character(character);

    log::info!("Scene ready: {} nodes", viewer.graph.len());
    Ok(())
}

/// Key presses and releases keyed by the frame they happen on.
fn script() -> Vec<(u32, InputEvent)> {
    vec![
        (10, InputEvent::press(Key::W)),
        (40, InputEvent::release(Key::W)),
        (45, InputEvent::press(Key::I)),
        (46, InputEvent::release(Key::I)),
        (50, InputEvent::press(Key::L)),
        (51, InputEvent::release(Key::L)),
        (55, InputEvent::press(Key::P)),
        (60, InputEvent::press(Key::Digit(1))),
        (61, InputEvent::release(Key::Digit(1))),
        (70, InputEvent::press(Key::O)),
        (90, InputEvent::press(Key::Space)),
        (91, InputEvent::release(Key::Space)),
        (120, InputEvent::press(Key::Escape)),
    ]
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => ViewerSettings::load(&path).with_context(|| format!("loading settings from {path}"))?,
        None => ViewerSettings::default(),
    };
    let (width, height) = (settings.window.width, settings.window.height);

    let clock = ManualClock::new(0.0);
    let mut viewer = Viewer::with_clock(settings, Box::new(clock.clone()));
    build_scene(&mut viewer)?;

    let script = script();
    let mut sink = LoggingSink::default();
    let mut frame: u32 = 0;
    while !viewer.should_close() {
        for (_, event) in script.iter().filter(|(at, _)| *at == frame) {
            viewer.on_key(*event);
        }

        let drawn_before = sink.calls;
        let time = viewer.frame(width, height, &mut sink);
        if frame % 30 == 0 {
            log::info!(
                "t={time:.2}s draws={} camera={} mode={:?}",
                sink.calls - drawn_before,
                viewer.camera.position,
                viewer.character().map(CharacterController::mode),
            );
        }

        clock.advance(FRAME_DT);
        frame += 1;
    }

    log::info!(
        "Closed after {frame} frames: {} draw calls, {} skinned",
        sink.calls,
        sink.skinned
    );
    Ok(())
}
