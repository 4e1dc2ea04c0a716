//! Entity builders: the recipes that turn primitives into scene furniture.
//!
//! Cones and cylinders tessellate open; the cap builders close them by
//! reading the mesh's circular profile and adding matching disks. Trees and
//! lamps are small groups assembled from those parts and stood upright by
//! their group transform (the circular primitives extrude along +Z, the
//! world is Y-up).

use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use cgmath::{Deg, Matrix4, Rad, Vector3};

use crate::error::{Error, Result};
use crate::gfx::geometry;
use crate::gfx::resources::{Material, Mesh};
use crate::gfx::scene::{EntityGroup, SceneNode};

/// Closes a cone node with a disk over its base.
///
/// Fails with [`Error::Precondition`] when the node's mesh carries no
/// circular profile to size the cap from.
pub fn capped_cone(node: SceneNode) -> Result<EntityGroup> {
    let profile = node.mesh.circular_profile().ok_or_else(|| {
        Error::precondition("capped_cone needs a node whose mesh has a circular profile")
    })?;

    let disk = Mesh::disk(profile.radius, profile.slices);
    // The base cap faces away from the cone body.
    let mut cap = SceneNode::new(disk)
        .with_transform(node.transform * Matrix4::from_angle_x(Rad(PI)));
    cap.material = node.material.clone();

    let mut group = EntityGroup::from_node(node);
    group.push(cap);
    Ok(group)
}

/// Closes a cylinder node with disks over both ends.
///
/// The cylinder's extent along +Z cannot be recovered from the profile, so
/// the caller passes it.
pub fn capped_cylinder(node: SceneNode, height: f32) -> Result<EntityGroup> {
    let profile = node.mesh.circular_profile().ok_or_else(|| {
        Error::precondition("capped_cylinder needs a node whose mesh has a circular profile")
    })?;

    // Both caps share one disk mesh.
    let disk = Mesh::disk(profile.radius, profile.slices);

    let mut bottom = SceneNode::new(Rc::clone(&disk))
        .with_transform(node.transform * Matrix4::from_angle_x(Rad(PI)));
    bottom.material = node.material.clone();

    let mut top = SceneNode::new(disk)
        .with_transform(node.transform * Matrix4::from_translation(Vector3::new(0.0, 0.0, height)));
    top.material = node.material.clone();

    let mut group = EntityGroup::from_node(node);
    group.push(bottom);
    group.push(top);
    Ok(group)
}

/// A tree: a trunk cylinder under a capped cone canopy, stood upright and
/// lifted so the trunk base sits on the ground.
pub fn tree(height: f32, trunk: Rc<Material>, top: Rc<Material>) -> EntityGroup {
    let canopy_node = SceneNode::new(Mesh::cone(1.0, height / 1.5, 16)).with_material(top);
    // Infallible: the cone mesh always carries its profile.
    let canopy = capped_cone(canopy_node).expect("cone mesh has a circular profile");

    let trunk_node = SceneNode::new(Mesh::cylinder(0.4, height / 3.0, 8))
        .with_transform(Matrix4::from_translation(Vector3::new(
            0.0,
            0.0,
            -height / 3.0,
        )))
        .with_material(trunk);

    let mut group = EntityGroup::from_node(trunk_node);
    group.append_group(canopy);
    group.group_transform = Matrix4::from_translation(Vector3::new(0.0, height / 3.0, 0.0))
        * Matrix4::from_angle_x(Rad(-FRAC_PI_2));
    group
}

/// A street lamp: an emissive cube head on a thin post, upright with the
/// post base at ground level.
pub fn lamp(height: f32, post: Rc<Material>, top: Rc<Material>) -> EntityGroup {
    let head = SceneNode::new(Mesh::cube(0.5)).with_material(top);

    let post_node = SceneNode::new(Mesh::cylinder(0.1, height - 0.5, 8))
        .with_transform(Matrix4::from_translation(Vector3::new(
            0.0,
            0.0,
            0.5 - height,
        )))
        .with_material(post);

    let mut group = EntityGroup::from_node(post_node);
    group.push(head);
    group.group_transform = Matrix4::from_angle_x(Rad(-FRAC_PI_2));
    group
}

/// The fallback car body: a wedge the size of a small coupe, origin at its
/// center, length along the z axis, roofline rising toward the rear.
pub fn basic_car(body: Rc<Material>) -> EntityGroup {
    let width = 2.0;
    let length = 4.0;
    let height = 1.0;

    let w2 = width / 2.0;
    let l2 = length / 2.0;

    let base = [
        [-w2, 0.0, -l2],
        [w2, 0.0, -l2],
        [w2, 0.0, l2],
        [-w2, 0.0, l2],
    ];
    let heights = [height / 2.0, height / 2.0, height, height];

    let mesh = Rc::new(Mesh::new(geometry::generate_building(base, heights)));
    EntityGroup::from_node(SceneNode::new(mesh).with_material(body))
}

/// A car body loaded from an OBJ model, flipped to face the +X heading the
/// mobile entity drives along.
pub fn obj_car(data: geometry::MeshData, body: Rc<Material>) -> EntityGroup {
    let mesh = Rc::new(Mesh::new(data));
    EntityGroup::from_node(
        SceneNode::new(mesh)
            .with_transform(Matrix4::from_angle_y(Deg(180.0)))
            .with_material(body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::DrawCall;
    use approx::assert_relative_eq;
    use cgmath::{Matrix4, SquareMatrix, Vector4};

    fn leaf() -> Rc<Material> {
        Rc::new(Material::matte(Vector3::new(0.0, 0.5, 0.0)))
    }

    fn bark() -> Rc<Material> {
        Rc::new(Material::matte(Vector3::new(0.5, 0.3, 0.0)))
    }

    #[test]
    fn capped_cone_adds_one_disk() {
        let group = capped_cone(SceneNode::new(Mesh::cone(1.0, 4.0, 16))).unwrap();
        assert_eq!(group.len(), 2);
        // The cap inherits the cone's slice count.
        let cap = &group.nodes()[1];
        assert_eq!(cap.mesh.circular_profile().unwrap().slices, 16);
    }

    #[test]
    fn capped_cone_rejects_profileless_meshes() {
        let result = capped_cone(SceneNode::new(Mesh::cube(1.0)));
        assert!(matches!(result, Err(Error::Precondition(_))));
    }

    #[test]
    fn capped_cylinder_shares_one_disk_between_caps() {
        let group = capped_cylinder(SceneNode::new(Mesh::cylinder(0.5, 2.0, 8)), 2.0).unwrap();
        assert_eq!(group.len(), 3);
        assert!(Rc::ptr_eq(&group.nodes()[1].mesh, &group.nodes()[2].mesh));
    }

    #[test]
    fn tree_is_trunk_plus_capped_canopy() {
        let group = tree(6.0, bark(), leaf());
        // trunk + cone + cap disk
        assert_eq!(group.len(), 3);
        assert_eq!(
            group.nodes()[0].mesh.circular_profile().unwrap().radius,
            0.4
        );
        assert_eq!(
            group.nodes()[1].mesh.circular_profile().unwrap().radius,
            1.0
        );
    }

    #[test]
    fn tree_trunk_base_lands_on_the_ground() {
        let height = 6.0;
        let group = tree(height, bark(), leaf());
        let mut calls: Vec<DrawCall> = Vec::new();
        group.render(Matrix4::identity(), &mut calls);

        // The trunk cylinder spans local z in [0, h/3] shifted down by h/3;
        // after the upright group transform its low end is y = 0.
        let trunk = &calls[0];
        let base = trunk.transform * Vector4::new(0.4, 0.0, 0.0, 1.0);
        assert_relative_eq!(base.y, 0.0, epsilon = 1e-5);
        let crown = trunk.transform * Vector4::new(0.4, 0.0, height / 3.0, 1.0);
        assert_relative_eq!(crown.y, height / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn lamp_head_sits_at_the_group_origin() {
        let group = lamp(4.0, bark(), leaf());
        assert_eq!(group.len(), 2);

        let mut calls: Vec<DrawCall> = Vec::new();
        group.render(Matrix4::identity(), &mut calls);
        let head = &calls[1];
        let center = head.transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.z, 0.0, epsilon = 1e-5);

        // The post reaches down to the ground plane 3.5 below the head.
        let post = &calls[0];
        let foot = post.transform * Vector4::new(0.1, 0.0, 0.0, 1.0);
        assert_relative_eq!(foot.y, -3.5, epsilon = 1e-4);
    }

    #[test]
    fn basic_car_is_a_single_wedge() {
        let group = basic_car(bark());
        assert_eq!(group.len(), 1);
        assert!(group.nodes()[0].mesh.circular_profile().is_none());
    }
}
