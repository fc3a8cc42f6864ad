//! Scene Graph Tests
//!
//! Tests for:
//! - World transform composition (`parent_world * local`)
//! - Depth-first, insertion-ordered traversal
//! - Animated control nodes driven by the frame clock
//! - Payload draw and input broadcast
//! - Visibility, instancing and name lookup

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use cove::animation::TransformTracks;
use cove::assets::{HeightField, MeshId};
use cove::clock::{Clock, ManualClock};
use cove::input::{InputEvent, Key};
use cove::math;
use cove::scene::presets::{self, Placement};
use cove::scene::{
    DrawList, DrawSink, Drawable, FrameContext, LocalTransform, Node, NodeHandle, SceneGraph, StaticMesh,
};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn mat4_approx(a: Mat4, b: Mat4) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn world_of(graph: &SceneGraph, handle: NodeHandle, time: f32) -> Mat4 {
    graph
        .world_transforms(Mat4::IDENTITY, time)
        .into_iter()
        .find(|(h, _)| *h == handle)
        .map(|(_, m)| m)
        .expect("node was not visited")
}

fn bobbing_tracks() -> TransformTracks {
    TransformTracks::from_keys(
        [
            (0.0, Vec3::new(0.0, 0.0, 0.0)),
            (1.0, Vec3::new(0.0, 2.0, 0.0)),
            (2.0, Vec3::new(0.0, 0.0, 0.0)),
        ],
        [(0.0, Quat::IDENTITY), (2.0, math::quaternion_from_axis_angle(Vec3::Y, 90.0))],
        [(0.0, 1.0)],
    )
    .unwrap()
}

/// Records the order and arguments of every call it receives.
struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<(String, Mat4)>>>,
    inputs: Rc<RefCell<Vec<(String, Key)>>>,
}

impl Drawable for Recorder {
    fn draw(&mut self, world: &Mat4, _frame: &FrameContext, _sink: &mut dyn DrawSink) {
        self.log.borrow_mut().push((self.name.to_string(), *world));
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.inputs.borrow_mut().push((self.name.to_string(), event.key));
    }
}

type DrawLog = Rc<RefCell<Vec<(String, Mat4)>>>;
type InputLog = Rc<RefCell<Vec<(String, Key)>>>;

fn recorder(name: &'static str, log: &DrawLog, inputs: &InputLog) -> Recorder {
    Recorder {
        name,
        log: Rc::clone(log),
        inputs: Rc::clone(inputs),
    }
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn child_world_is_parent_times_local() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::with_transform(math::translate(0.0, 5.0, 0.0)));
    let child = graph.insert_child(root, Node::with_transform(math::translate(1.0, 0.0, 0.0)));

    let world = world_of(&graph, child, 0.0);
    assert!(mat4_approx(world, math::translate(1.0, 5.0, 0.0)));
}

#[test]
fn parent_world_argument_is_applied() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::with_transform(math::rotate(Vec3::Y, 90.0)));

    let parent = math::translate(0.0, 0.0, 3.0);
    let visits = graph.world_transforms(parent, 0.0);
    assert_eq!(visits[0].0, root);
    assert!(mat4_approx(visits[0].1, parent * math::rotate(Vec3::Y, 90.0)));
}

#[test]
fn deep_chain_composes_in_order() {
    let mut graph = SceneGraph::new();
    let mut handle = graph.add_node(Node::with_transform(math::rotate(Vec3::Z, 90.0)));
    let mut expected = math::rotate(Vec3::Z, 90.0);
    for i in 0..10 {
        let local = math::translate(1.0, 0.0, 0.0) * math::uniform_scale(1.0 + i as f32 * 0.1);
        handle = graph.insert_child(handle, Node::with_transform(local));
        expected *= local;
    }
    assert!(mat4_approx(world_of(&graph, handle, 0.0), expected));
}

// ============================================================================
// Traversal order
// ============================================================================

#[test]
fn traversal_is_depth_first_in_insertion_order() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new().named("root"));
    let a = graph.insert_child(root, Node::new().named("a"));
    let _a1 = graph.insert_child(a, Node::new().named("a1"));
    let _a2 = graph.insert_child(a, Node::new().named("a2"));
    let _b = graph.insert_child(root, Node::new().named("b"));
    let _second_root = graph.add_node(Node::new().named("second_root"));

    let names: Vec<String> = graph
        .world_transforms(Mat4::IDENTITY, 0.0)
        .into_iter()
        .map(|(h, _)| graph.get(h).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["root", "a", "a1", "a2", "b", "second_root"]);
}

#[test]
fn payloads_draw_in_traversal_order_with_their_world() {
    let log: DrawLog = Rc::default();
    let inputs: InputLog = Rc::default();

    let mut graph = SceneGraph::new();
    let root = graph.add_node(
        Node::with_transform(math::translate(0.0, 5.0, 0.0)).with_payload(recorder("root", &log, &inputs)),
    );
    graph.insert_child(
        root,
        Node::with_transform(math::translate(1.0, 0.0, 0.0)).with_payload(recorder("first", &log, &inputs)),
    );
    graph.insert_child(
        root,
        Node::with_transform(math::translate(0.0, 0.0, 2.0)).with_payload(recorder("second", &log, &inputs)),
    );

    let mut sink = DrawList::new();
    graph.draw(Mat4::IDENTITY, &FrameContext::at(0.0), &mut sink);

    let log = log.borrow();
    let names: Vec<&str> = log.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["root", "first", "second"]);
    assert!(mat4_approx(log[1].1, math::translate(1.0, 5.0, 0.0)));
    assert!(mat4_approx(log[2].1, math::translate(0.0, 5.0, 2.0)));
}

// ============================================================================
// Referential transparency & animation
// ============================================================================

#[test]
fn draw_twice_at_same_time_is_identical() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::animated(bobbing_tracks()));
    graph.insert_child(root, Node::new().with_payload(StaticMesh::new(MeshId(1))));

    let frame = FrameContext::at(0.73);
    let mut first = DrawList::new();
    let mut second = DrawList::new();
    graph.draw(Mat4::IDENTITY, &frame, &mut first);
    graph.draw(Mat4::IDENTITY, &frame, &mut second);

    assert_eq!(first.calls, second.calls);
    assert_eq!(first.len(), 1);
}

#[test]
fn animated_node_follows_clock() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::animated(bobbing_tracks()));

    let at_one = world_of(&graph, node, 1.0);
    assert!(at_one.w_axis.truncate().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPSILON));

    let at_half = world_of(&graph, node, 0.5);
    assert!(at_half.w_axis.truncate().abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), EPSILON));
}

#[test]
fn clock_reset_snaps_back_to_time_zero_pose() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::animated(bobbing_tracks()));

    let mut clock = ManualClock::new(0.0);
    let initial = world_of(&graph, node, clock.now());

    clock.advance(1.3);
    let moved = world_of(&graph, node, clock.now());
    assert!(!mat4_approx(initial, moved));

    clock.reset();
    let after_reset = world_of(&graph, node, clock.now());
    assert_eq!(after_reset, initial);
}

#[test]
fn animated_parent_moves_static_child() {
    let mut graph = SceneGraph::new();
    let ship = graph.add_node(Node::animated(bobbing_tracks()));
    let deck = graph.insert_child(ship, Node::with_transform(math::translate(3.0, 0.0, 0.0)));

    let expected = bobbing_tracks().matrix_at(1.0) * math::translate(3.0, 0.0, 0.0);
    assert!(mat4_approx(world_of(&graph, deck, 1.0), expected));
}

#[test]
fn set_local_replaces_transform_source() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::animated(bobbing_tracks()));
    assert!(graph.get(node).unwrap().local.is_animated());

    assert!(graph.set_local(node, LocalTransform::Static(math::translate(7.0, 0.0, 0.0))));
    assert!(mat4_approx(world_of(&graph, node, 1.0), math::translate(7.0, 0.0, 0.0)));
}

// ============================================================================
// Input broadcast
// ============================================================================

#[test]
fn input_reaches_every_payload_including_hidden() {
    let log: DrawLog = Rc::default();
    let inputs: InputLog = Rc::default();

    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new().with_payload(recorder("root", &log, &inputs)));
    let hidden = graph.insert_child(root, Node::new().with_payload(recorder("hidden", &log, &inputs)));
    graph.insert_child(hidden, Node::new().with_payload(recorder("grandchild", &log, &inputs)));
    graph.set_visible(hidden, false);

    graph.dispatch_input(&InputEvent::press(Key::U));

    let inputs = inputs.borrow();
    let names: Vec<&str> = inputs.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["root", "hidden", "grandchild"]);
    assert!(inputs.iter().all(|(_, k)| *k == Key::U));

    // hidden subtree is still skipped when drawing
    graph.draw(Mat4::IDENTITY, &FrameContext::at(0.0), &mut DrawList::new());
    assert_eq!(log.borrow().len(), 1);
}

// ============================================================================
// Instancing & lookup
// ============================================================================

#[test]
fn shared_child_is_drawn_once_per_parent() {
    let mut graph = SceneGraph::new();
    let mesh = graph.create_node(Node::new().with_payload(StaticMesh::new(MeshId(7))));
    for x in [0.0, 10.0, 20.0] {
        let holder = graph.add_node(Node::with_transform(math::translate(x, 0.0, 0.0)));
        graph.add_child(holder, mesh);
    }

    let mut sink = DrawList::new();
    graph.draw(Mat4::IDENTITY, &FrameContext::at(0.0), &mut sink);

    let xs: Vec<f32> = sink.calls.iter().map(|c| c.model.w_axis.x).collect();
    assert_eq!(xs, [0.0, 10.0, 20.0]);
    assert!(sink.calls.iter().all(|c| c.mesh == MeshId(7) && c.skinning.is_none()));
}

#[test]
fn find_by_name_and_children() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new().named("base"));
    let boat = graph.insert_child(root, Node::new().named("boat"));

    assert_eq!(graph.find_by_name("boat"), Some(boat));
    assert_eq!(graph.find_by_name("kraken"), None);
    assert_eq!(graph.children(root), &[boat]);
    assert_eq!(graph.roots(), &[root]);
    assert_eq!(graph.len(), 2);
}

#[test]
fn uniforms_are_forwarded_to_draw_calls() {
    let mut graph = SceneGraph::new();
    graph.add_node(Node::new().with_payload(StaticMesh::new(MeshId(3))));

    let mut frame = FrameContext::at(2.0);
    frame.uniforms.light_dir = Vec3::new(0.6, -0.8, 0.1);
    let mut sink = DrawList::new();
    graph.draw(Mat4::IDENTITY, &frame, &mut sink);

    assert_eq!(sink.calls[0].uniforms, frame.uniforms);
}

// ============================================================================
// Looping presets
// ============================================================================

#[test]
fn looping_ship_keeps_bobbing_after_last_key() {
    let mut graph = SceneGraph::new();
    let tracks = presets::ship_bob_tracks(100.0, 84.0, 0.0, 0.5).unwrap();
    let looping = graph.add_node(Node::looping(tracks.clone()));
    let clamped = graph.add_node(Node::animated(tracks));

    // 36 s is 4 s into the second lap, at the crest
    let crest = world_of(&graph, looping, 36.0).w_axis.y;
    assert!((crest - 0.5).abs() < EPSILON, "got {crest}");
    assert!(mat4_approx(world_of(&graph, looping, 100.0), world_of(&graph, looping, 4.0)));

    // a clamping node holds its last key
    assert_eq!(world_of(&graph, clamped, 36.0), world_of(&graph, clamped, 500.0));
}

#[test]
fn formation_seagulls_keep_circling() {
    let mut graph = SceneGraph::new();
    let model = graph.create_node(Node::new().named("gull"));
    let root =
        presets::build_seagull_formation(&mut graph, None, model, Vec3::new(0.0, 50.0, 0.0), 80.0, 2, &[])
            .unwrap();
    let leader = graph.find_by_name("seagull_0").unwrap();
    assert_eq!(graph.children(root).len(), 3);

    let first_lap = world_of(&graph, leader, 5.0);
    let third_lap = world_of(&graph, leader, 69.0);
    assert!(first_lap.w_axis.abs_diff_eq(third_lap.w_axis, 1e-3));
    assert!(!mat4_approx(world_of(&graph, leader, 40.0), world_of(&graph, leader, 32.0)));
}

#[test]
fn seagull_trio_flies_abreast_with_raised_leader() {
    let mut graph = SceneGraph::new();
    let model = graph.create_node(Node::new().named("gull"));
    let center = Vec3::new(10.0, 60.0, -5.0);
    let heights = [1.0; 33];
    let root = presets::build_seagull_trio(&mut graph, None, model, center, 80.0, &heights).unwrap();

    let flyers = graph.children(root).to_vec();
    assert_eq!(flyers.len(), 3);
    let names: Vec<&str> = flyers.iter().map(|h| graph.get(*h).unwrap().name.as_str()).collect();
    assert_eq!(names, ["seagull_left", "seagull_centre", "seagull_right"]);

    // at t = 0 the wingmen sit on +Z of the circle at radius -/+ 15
    let left = world_of(&graph, flyers[0], 0.0).w_axis.truncate();
    let right = world_of(&graph, flyers[2], 0.0).w_axis.truncate();
    assert!(left.abs_diff_eq(center + Vec3::new(0.0, 1.0, 65.0), 1e-3), "left {left}");
    assert!(right.abs_diff_eq(center + Vec3::new(0.0, 1.0, 95.0), 1e-3), "right {right}");

    // the centre bird is half a key ahead and 2.5 higher
    let angle = 0.5 * std::f32::consts::PI / 8.0;
    let expected = center + Vec3::new(80.0 * angle.sin(), 3.5, 80.0 * angle.cos());
    let centre = world_of(&graph, flyers[1], 0.0).w_axis.truncate();
    assert!(centre.abs_diff_eq(expected, 1e-3), "centre {centre}");

    // every bird instances the one model
    let models = graph
        .world_transforms(Mat4::IDENTITY, 0.0)
        .into_iter()
        .filter(|(h, _)| *h == model)
        .count();
    assert_eq!(models, 3);
}

// ============================================================================
// Terrain scatter
// ============================================================================

#[test]
fn scattered_instances_stand_on_the_terrain() {
    // 4x4 grid, height rises with x: sample = 64 * x
    let samples = (0..16).map(|i| (i / 4) as u8 * 64).collect();
    let terrain = HeightField::from_samples(4, 4, samples, 32.0).unwrap();

    let mut graph = SceneGraph::new();
    let tree = graph.create_node(Node::new().with_payload(StaticMesh::new(MeshId(11))));
    let placements = [
        Placement::at(0.0, 1.0),
        Placement::at(2.0, 3.0),
        Placement::at(3.5, 0.0).with_scale(0.5),
    ];
    let root = presets::scatter_on_terrain(&mut graph, None, "trees", tree, &terrain, &placements);
    assert_eq!(graph.get(root).unwrap().name, "trees");
    assert_eq!(graph.children(root).len(), 3);

    let mut sink = DrawList::new();
    graph.draw(Mat4::IDENTITY, &FrameContext::at(0.0), &mut sink);
    let positions: Vec<Vec3> = sink.calls.iter().map(|c| c.model.w_axis.truncate()).collect();
    assert_eq!(positions.len(), 3);
    // height = sample * 32 / 256 = 8 * x
    assert!(positions[0].abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPSILON));
    assert!(positions[1].abs_diff_eq(Vec3::new(2.0, 16.0, 3.0), EPSILON));
    assert!(positions[2].abs_diff_eq(Vec3::new(3.5, 24.0, 0.0), EPSILON));
    assert!((sink.calls[2].model.x_axis.x - 0.5).abs() < EPSILON);
}

#[test]
fn scattered_rotation_applies_before_placement() {
    let terrain = HeightField::flat(8, 8);
    let mut graph = SceneGraph::new();
    let rock = graph.create_node(Node::new().named("rock"));
    let placement = Placement::at(4.0, 5.0).with_rotation(math::quaternion_from_axis_angle(Vec3::X, 90.0));
    presets::scatter_on_terrain(&mut graph, None, "rocks", rock, &terrain, &[placement]);

    let world = world_of(&graph, rock, 0.0);
    let expected = math::translate(4.0, 0.0, 5.0) * math::rotate(Vec3::X, 90.0);
    assert!(mat4_approx(world, expected));
}
