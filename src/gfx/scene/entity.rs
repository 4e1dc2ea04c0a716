//! Scene nodes and entity groups.
//!
//! A [`SceneNode`] links one shared mesh to an exclusively-owned local
//! transform, an optional shared material and a normal-map flag. An
//! [`EntityGroup`] owns an ordered set of nodes behind a single group
//! transform; pushing into a group moves the node, so a node or subgroup
//! can never be reachable from two parents.
//!
//! Rendering does not touch the GPU here. Traversal computes each node's
//! effective transform and submits a [`DrawCall`] to a [`DrawSink`]: the
//! render engine drains the sink into actual draw commands, and tests drain
//! it into a plain `Vec`.

use std::rc::Rc;

use cgmath::Matrix4;

use crate::gfx::resources::{Material, Mesh, RenderContext};

/// One resolved draw: a mesh, its final model matrix, and shader state.
#[derive(Clone)]
pub struct DrawCall {
    pub mesh: Rc<Mesh>,
    pub transform: Matrix4<f32>,
    pub material: Option<Rc<Material>>,
    pub normal_map: bool,
}

/// Receiver for resolved draws; the seam between the scene graph and the
/// renderer.
pub trait DrawSink {
    fn submit(&mut self, call: DrawCall);
}

impl DrawSink for Vec<DrawCall> {
    fn submit(&mut self, call: DrawCall) {
        self.push(call);
    }
}

/// A single drawable in the scene: shared mesh, owned local transform,
/// optional shared material.
pub struct SceneNode {
    /// Shared with every other node using the same geometry.
    pub mesh: Rc<Mesh>,
    /// This node's transform from the mesh's modeling space.
    pub transform: Matrix4<f32>,
    /// `None` means the surrounding shader state is left untouched.
    pub material: Option<Rc<Material>>,
    /// Whether the mesh's normal map should perturb shading.
    pub normal_map: bool,
}

impl SceneNode {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh,
            transform: cgmath::SquareMatrix::identity(),
            material: None,
            normal_map: false,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Rc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_normal_map(mut self, enabled: bool) -> Self {
        self.normal_map = enabled;
        self
    }

    /// Submits this node with `obj_to_world * local` as the model matrix.
    pub fn render(&self, obj_to_world: Matrix4<f32>, sink: &mut dyn DrawSink) {
        sink.submit(DrawCall {
            mesh: Rc::clone(&self.mesh),
            transform: obj_to_world * self.transform,
            material: self.material.clone(),
            normal_map: self.normal_map,
        });
    }

    pub fn init_mesh(&self, ctx: &RenderContext) {
        self.mesh.init(ctx);
    }
}

impl Default for SceneNode {
    /// A node with no mesh specified falls back to a unit cube.
    fn default() -> Self {
        Self::new(Mesh::unit_cube())
    }
}

/// An owned, ordered collection of [`SceneNode`]s moved as one unit by a
/// group-level transform.
///
/// Append is the only growth operation, and both `push` and `append_group`
/// take their argument by value, so exclusive ownership transfers into the
/// group, which is what rules out a node or group appearing under two
/// parents.
pub struct EntityGroup {
    nodes: Vec<SceneNode>,
    /// Moves the entire group; applied before every member's local
    /// transform.
    pub group_transform: Matrix4<f32>,
}

impl EntityGroup {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            group_transform: cgmath::SquareMatrix::identity(),
        }
    }

    pub fn from_node(node: SceneNode) -> Self {
        let mut group = Self::new();
        group.push(node);
        group
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.group_transform = transform;
        self
    }

    /// Adds a node after the existing members. Order carries no meaning;
    /// no member depends on another's render state.
    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Absorbs another group's members.
    ///
    /// The absorbed group's transform is folded into each of its nodes'
    /// local transforms, so the merged nodes keep their appearance while
    /// only this group's transform moves them from now on.
    pub fn append_group(&mut self, other: EntityGroup) {
        for mut node in other.nodes {
            node.transform = other.group_transform * node.transform;
            self.nodes.push(node);
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Submits every member with `ambient * group_transform * local` as its
    /// model matrix, each exactly once.
    pub fn render(&self, ambient: Matrix4<f32>, sink: &mut dyn DrawSink) {
        let group_to_world = ambient * self.group_transform;
        for node in &self.nodes {
            node.render(group_to_world, sink);
        }
    }

    /// Ensures every member's mesh has GPU-resident buffers.
    pub fn init_meshes(&self, ctx: &RenderContext) {
        for node in &self.nodes {
            node.init_mesh(ctx);
        }
    }
}
