use glam::{Mat4, Vec3};

use crate::assets::HeightField;
use crate::config::CharacterSettings;
use crate::input::{InputEvent, Key, KeyAction};
use crate::math;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{LocalTransform, Node};
use crate::scene::NodeHandle;

/// Which pose subtree of the character is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharacterMode {
    #[default]
    Idle,
    Run,
    Jump,
    Victory,
}

impl CharacterMode {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Run, Self::Jump, Self::Victory];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Run => 1,
            Self::Jump => 2,
            Self::Victory => 3,
        }
    }
}

/// Keyboard-driven character walking over a height field.
///
/// The character owns four pose nodes in the scene graph (idle, run, jump,
/// victory); only the one matching the current mode is visible. I/J/K/L
/// step along +X/-Z/-X/+Z, U jumps, O celebrates, and releasing any key
/// returns to idle.
#[derive(Debug, Clone)]
pub struct CharacterController {
    poses: [NodeHandle; 4],
    terrain: HeightField,
    settings: CharacterSettings,
    mode: CharacterMode,
    x: f32,
    z: f32,
    /// Degrees about +Y
    heading: f32,
}

impl CharacterController {
    #[must_use]
    pub fn new(poses: [NodeHandle; 4], terrain: HeightField, settings: CharacterSettings) -> Self {
        Self {
            poses,
            terrain,
            mode: CharacterMode::Idle,
            x: settings.start_x,
            z: settings.start_z,
            heading: 0.0,
            settings,
        }
    }

    /// Inserts the four pose nodes under `parent` (or as roots) and places
    /// the character at its start position.
    pub fn spawn(
        graph: &mut SceneGraph,
        parent: Option<NodeHandle>,
        poses: [Node; 4],
        terrain: HeightField,
        settings: CharacterSettings,
    ) -> Self {
        let handles = poses.map(|node| match parent {
            Some(p) => graph.insert_child(p, node),
            None => graph.add_node(node),
        });
        let controller = Self::new(handles, terrain, settings);
        controller.apply(graph);
        controller
    }

    #[must_use]
    pub fn mode(&self) -> CharacterMode {
        self.mode
    }

    #[must_use]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    #[must_use]
    pub fn poses(&self) -> &[NodeHandle; 4] {
        &self.poses
    }

    #[must_use]
    pub fn pose_node(&self, mode: CharacterMode) -> NodeHandle {
        self.poses[mode.index()]
    }

    /// World position including terrain height.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.ground_height(), self.z)
    }

    /// Terrain height under the character, lowered past the shore line.
    #[must_use]
    pub fn ground_height(&self) -> f32 {
        let s = &self.settings;
        let tx = s.terrain_offset + self.x;
        let tz = s.terrain_offset + self.z;
        let mut height = self.terrain.height_at(tx, tz);
        if tz < s.shore_z {
            height -= (s.dip_rate * (s.shore_z - tz)).min(s.max_dip);
        }
        height
    }

    /// Local transform shared by every pose node.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        math::translate_v(self.position())
            * math::rotate(Vec3::Y, self.heading)
            * math::uniform_scale(self.settings.scale)
    }

    fn step(&mut self, direction: Vec3, heading: f32) {
        let s = &self.settings;
        self.mode = CharacterMode::Run;
        self.heading = heading;
        self.x = (self.x + s.move_speed * direction.x).clamp(-s.bound, s.bound);
        self.z = (self.z + s.move_speed * direction.z).clamp(-s.bound, s.bound);
    }

    /// Updates mode and position from a key event. Returns true when the
    /// event was consumed.
    pub fn handle_key(&mut self, event: &InputEvent) -> bool {
        if event.action == KeyAction::Release {
            self.mode = CharacterMode::Idle;
            return true;
        }
        match event.key {
            Key::I => self.step(Vec3::X, 90.0),
            Key::J => self.step(Vec3::NEG_Z, 180.0),
            Key::K => self.step(Vec3::NEG_X, 270.0),
            Key::L => self.step(Vec3::Z, 0.0),
            Key::U => self.mode = CharacterMode::Jump,
            Key::O => self.mode = CharacterMode::Victory,
            _ => return false,
        }
        log::trace!("Character {:?} at ({}, {})", self.mode, self.x, self.z);
        true
    }

    /// Back to idle. Position and heading are kept.
    pub fn reset(&mut self) {
        self.mode = CharacterMode::Idle;
    }

    /// Writes pose transforms and visibility into the graph.
    pub fn apply(&self, graph: &mut SceneGraph) {
        let local = self.local_matrix();
        for mode in CharacterMode::ALL {
            let handle = self.poses[mode.index()];
            graph.set_local(handle, LocalTransform::Static(local));
            graph.set_visible(handle, mode == self.mode);
        }
    }
}
