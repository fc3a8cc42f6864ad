//! Skinning and traversal benchmarks.
//!
//! Run with `cargo bench --bench skinning_bench`.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};

use cove::animation::{AnimationClip, LoopMode, TransformTracks};
use cove::assets::MeshId;
use cove::math;
use cove::scene::{BoneDesc, DrawList, FrameContext, Node, SceneGraph, Skeleton, SkinningPose, StaticMesh};

fn chain_skeleton(bones: usize) -> Skeleton {
    let descs = (0..bones)
        .map(|i| {
            let parent = i.checked_sub(1);
            BoneDesc::new(format!("bone_{i}"), parent, math::translate(0.0, 1.0, 0.0))
        })
        .collect();
    Skeleton::new("chain", descs).unwrap()
}

fn sway_clip(bones: usize) -> AnimationClip {
    let channels = (0..bones).map(|i| {
        let tracks = TransformTracks::from_keys(
            [(0.0, Vec3::Y)],
            [
                (0.0, Quat::IDENTITY),
                (12.0, math::quaternion_from_axis_angle(Vec3::Z, 15.0)),
                (24.0, Quat::IDENTITY),
            ],
            [(0.0, 1.0)],
        )
        .unwrap();
        (format!("bone_{i}"), tracks)
    });
    AnimationClip::new("sway", channels, None, 24.0).with_loop_mode(LoopMode::Repeat)
}

fn compute_pose_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_pose");
    for bones in [16, 64, 128] {
        let skeleton = chain_skeleton(bones);
        let bound = skeleton.bind_clip(Arc::new(sway_clip(bones)));
        let mut pose = SkinningPose::new();

        group.bench_with_input(BenchmarkId::from_parameter(bones), &bones, |b, _| {
            let mut t = 0.0_f32;
            b.iter(|| {
                t += 1.0 / 60.0;
                skeleton.compute_pose(Some(&bound), black_box(t), &mut pose);
                black_box(pose.skinning_matrices());
            });
        });
    }
    group.finish();
}

fn graph_draw_benchmark(c: &mut Criterion) {
    let mut graph = SceneGraph::new();
    let bob = TransformTracks::from_keys(
        [(0.0, Vec3::ZERO), (16.0, Vec3::Y), (32.0, Vec3::ZERO)],
        [(0.0, Quat::IDENTITY)],
        [(0.0, 1.0)],
    )
    .unwrap();
    let bob = Arc::new(bob);
    let mesh = graph.create_node(Node::new().with_payload(StaticMesh::new(MeshId(0))));
    for i in 0..256 {
        let holder = graph.add_node(Node::animated(Arc::clone(&bob)));
        let offset = graph.insert_child(holder, Node::with_transform(math::translate(i as f32, 0.0, 0.0)));
        graph.add_child(offset, mesh);
    }

    let mut sink = DrawList::new();
    c.bench_function("graph_draw_256_instances", |b| {
        b.iter(|| {
            sink.clear();
            graph.draw(Mat4::IDENTITY, &FrameContext::at(black_box(7.5)), &mut sink);
            black_box(sink.len());
        });
    });
}

criterion_group!(benches, compute_pose_benchmark, graph_draw_benchmark);
criterion_main!(benches);
