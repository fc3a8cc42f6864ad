//! Procedural keyframe animations and layouts used to assemble the harbour
//! scene.
//!
//! Times are in seconds. Every track here has its last key at
//! [`LOOP_KEYS`] and ends on the pose it starts with, so a node built with
//! [`Node::looping`] repeats it seamlessly. Ships bob twice per loop.

use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};

use crate::animation::{KeyframeTrack, TransformTracks};
use crate::assets::HeightField;
use crate::errors::Result;
use crate::math;
use crate::scene::NodeHandle;
use crate::scene::graph::SceneGraph;
use crate::scene::node::Node;

/// Last key time of every preset loop.
pub const LOOP_KEYS: u16 = 32;

/// Radial spacing between neighbouring seagulls.
const FORMATION_SPACING: f32 = 15.0;
/// Height drop per position away from the leader.
const FORMATION_DROP: f32 = 3.0;
/// Keys by which the centre bird of a trio leads its wingmen.
const TRIO_LEAD_KEYS: f32 = 0.5;
/// Height of the centre bird of a trio above its wingmen.
const TRIO_LEAD_LIFT: f32 = 2.5;

fn key_times() -> impl Iterator<Item = f32> {
    (0..=LOOP_KEYS).map(f32::from)
}

/// Tide motion of a ship anchored at `(x, z)`: a sine of amplitude
/// `y_range` with a 16 second period, phase-shifted by `offset` seconds.
///
/// Attach with [`Node::looping`] to keep the ship moving past 32 s.
pub fn ship_bob_tracks(x: f32, z: f32, offset: f32, y_range: f32) -> Result<TransformTracks> {
    let translation = key_times().map(|t| {
        let phase = ((t + offset) % 16.0) * PI / 8.0;
        (t, Vec3::new(x, y_range * phase.sin(), z))
    });
    TransformTracks::from_keys(translation, [(0.0, Quat::IDENTITY)], [(0.0, 1.0)])
}

/// One lap of radius `radius` around `center`, `lead` keys ahead of the
/// clock and raised by `lift`. `heights` adds a per-key vertical offset;
/// missing entries count as zero.
fn orbit_tracks(center: Vec3, radius: f32, lead: f32, lift: f32, heights: &[f32]) -> Result<TransformTracks> {
    let translation = (0..=LOOP_KEYS).map(|i| {
        let t = f32::from(i);
        let angle = ((t + lead) % 32.0) * PI / 8.0;
        let jitter = heights.get(usize::from(i)).copied().unwrap_or(0.0);
        let position = Vec3::new(
            center.x + radius * angle.sin(),
            center.y + lift + jitter,
            center.z + radius * angle.cos(),
        );
        (t, position)
    });

    Ok(TransformTracks::new(
        KeyframeTrack::new("translation", translation)?,
        seagull_heading_track()?,
        KeyframeTrack::constant("scale", Vec3::ONE),
    ))
}

/// Circular flight path around `center`.
///
/// `relative_position` is the slot in the V formation: 0 leads, negative
/// slots fly inside the circle, positive outside. `heights` adds a per-key
/// vertical offset; missing entries count as zero.
pub fn seagull_orbit_tracks(
    center: Vec3,
    radius: f32,
    relative_position: i32,
    heights: &[f32],
) -> Result<TransformTracks> {
    let slot = relative_position as f32;
    orbit_tracks(
        center,
        radius + FORMATION_SPACING * slot,
        0.0,
        -FORMATION_DROP * slot.abs(),
        heights,
    )
}

/// Heading of a circling seagull: two half turns per 16 seconds about +Y.
///
/// The full turn at 16 s arrives at 360° and departs from 0°, so the second
/// lap starts from identity without spinning back.
pub fn seagull_heading_track() -> Result<KeyframeTrack<Quat>> {
    let half = math::quaternion_from_euler(0.0, 180.0, 0.0);
    let full = math::quaternion_from_euler(0.0, 360.0, 0.0);

    let mut track = KeyframeTrack::new(
        "rotation",
        [(0.0, math::quaternion()), (8.0, half), (24.0, half), (32.0, full)],
    )?;
    track.set_discontinuous(16.0, full, math::quaternion())?;
    Ok(track)
}

fn attach(graph: &mut SceneGraph, parent: Option<NodeHandle>, node: Node) -> NodeHandle {
    match parent {
        Some(p) => graph.insert_child(p, node),
        None => graph.add_node(node),
    }
}

/// Adds a looping flyer under `root` whose oriented body instances `model`.
fn add_flyer(
    graph: &mut SceneGraph,
    root: NodeHandle,
    model: NodeHandle,
    name: String,
    tracks: TransformTracks,
) -> NodeHandle {
    let flyer = graph.insert_child(root, Node::looping(tracks).named(name));
    let body = graph.insert_child(
        flyer,
        Node::with_transform(math::rotate(Vec3::Y, -90.0) * math::uniform_scale(0.25)),
    );
    graph.add_child(body, model);
    flyer
}

/// Builds a V formation of `2 * count_each_side - 1` seagulls under
/// `parent`, all instancing `model`.
///
/// Each seagull is a looping animated node holding an oriented, scaled group
/// that lists `model` as its child. Returns the formation root.
pub fn build_seagull_formation(
    graph: &mut SceneGraph,
    parent: Option<NodeHandle>,
    model: NodeHandle,
    center: Vec3,
    radius: f32,
    count_each_side: i32,
    heights: &[f32],
) -> Result<NodeHandle> {
    let root = attach(graph, parent, Node::new().named("seagull_formation"));

    for slot in (1 - count_each_side)..count_each_side {
        let tracks = seagull_orbit_tracks(center, radius, slot, heights)?;
        add_flyer(graph, root, model, format!("seagull_{slot}"), tracks);
    }

    log::debug!(
        "Seagull formation: {} birds around {center}",
        graph.children(root).len()
    );
    Ok(root)
}

/// Builds three seagulls flying abreast: left inside the circle, right
/// outside, and the centre bird half a key ahead and slightly higher.
///
/// All three share `heights`. Returns the trio root, whose children are the
/// left, centre and right flyers in that order.
pub fn build_seagull_trio(
    graph: &mut SceneGraph,
    parent: Option<NodeHandle>,
    model: NodeHandle,
    center: Vec3,
    radius: f32,
    heights: &[f32],
) -> Result<NodeHandle> {
    let root = attach(graph, parent, Node::new().named("seagull_trio"));

    let left = orbit_tracks(center, radius - FORMATION_SPACING, 0.0, 0.0, heights)?;
    let middle = orbit_tracks(center, radius, TRIO_LEAD_KEYS, TRIO_LEAD_LIFT, heights)?;
    let right = orbit_tracks(center, radius + FORMATION_SPACING, 0.0, 0.0, heights)?;

    add_flyer(graph, root, model, "seagull_left".to_string(), left);
    add_flyer(graph, root, model, "seagull_centre".to_string(), middle);
    add_flyer(graph, root, model, "seagull_right".to_string(), right);
    Ok(root)
}

/// Where one scattered instance goes, in height-field coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub z: f32,
    pub rotation: Quat,
    pub scale: f32,
}

impl Placement {
    #[must_use]
    pub fn at(x: f32, z: f32) -> Self {
        Self {
            x,
            z,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// `T(x, ground, z) * R * S`, with the ground height read from `terrain`.
    #[must_use]
    pub fn local_matrix(&self, terrain: &HeightField) -> Mat4 {
        let ground = terrain.height_at(self.x, self.z);
        math::translate(self.x, ground, self.z)
            * Mat4::from_quat(self.rotation)
            * math::uniform_scale(self.scale)
    }
}

/// Instances `model` once per placement, standing on `terrain`.
///
/// Used for trees on the grass and rocks on the beach. Returns the group
/// root named `name`.
pub fn scatter_on_terrain(
    graph: &mut SceneGraph,
    parent: Option<NodeHandle>,
    name: &str,
    model: NodeHandle,
    terrain: &HeightField,
    placements: &[Placement],
) -> NodeHandle {
    let root = attach(graph, parent, Node::new().named(name));
    for placement in placements {
        let holder = graph.insert_child(root, Node::with_transform(placement.local_matrix(terrain)));
        graph.add_child(holder, model);
    }
    log::debug!("Scattered {} x '{name}'", placements.len());
    root
}
