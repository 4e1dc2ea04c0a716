//! The world: top-level owner of the scene's entity forest.
//!
//! Built once from a [`SceneDescription`], the world owns every entity
//! group (track, trees, lamps, buildings, ground and the drivable car),
//! the shared material instances they reference, the lighting parameters
//! and the camera anchor points. Rendering traverses the forest in a fixed
//! order, lazily initializing GPU meshes exactly once on the first frame.

pub mod builders;
pub mod description;

use std::cell::Cell;
use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::error::Result;
use crate::gfx::resources::{load_obj_mesh, Material, Mesh, NormalMapImage, RenderContext};
use crate::gfx::scene::{DrawSink, EntityGroup, MobileEntity, SceneNode};
use crate::procedural;

pub use description::SceneDescription;

/// The shader exposes twelve point-light slots; unused slots are flagged
/// off in the frame uniform.
pub const MAX_LAMPS: usize = 12;

/// Side length of the generated track normal map.
const TRACK_NORMAL_MAP_SIZE: u32 = 512;

/// One reflectance definition per kind of surface, each shared by every
/// node of that kind.
pub struct WorldMaterials {
    pub ground: Rc<Material>,
    pub track: Rc<Material>,
    pub tree_top: Rc<Material>,
    pub trunk: Rc<Material>,
    pub building: Rc<Material>,
    pub lamp_head: Rc<Material>,
    pub lamp_post: Rc<Material>,
    pub car_body: Rc<Material>,
}

impl WorldMaterials {
    fn demo() -> Self {
        let v = Vector3::new;
        Self {
            ground: Rc::new(Material::matte(v(0.671, 0.486, 0.246))),
            track: Rc::new(Material::new(
                v(0.0, 0.0, 0.0),
                v(0.0, 0.0, 0.0),
                v(0.150, 0.150, 0.150),
                v(0.1, 0.1, 0.1),
                40.0,
            )),
            tree_top: Rc::new(Material::matte(v(0.031, 0.565, 0.067))),
            trunk: Rc::new(Material::matte(v(0.565, 0.341, 0.051))),
            building: Rc::new(Material::matte(v(0.898, 0.898, 0.898))),
            lamp_head: Rc::new(Material::new(
                v(1.0, 1.0, 1.0),
                v(0.0, 0.0, 0.0),
                v(1.0, 1.0, 1.0),
                v(0.0, 0.0, 0.0),
                1.0,
            )),
            lamp_post: Rc::new(Material::new(
                v(0.0, 0.0, 0.0),
                v(0.0, 0.0, 0.0),
                v(0.671, 0.671, 0.671),
                v(1.0, 1.0, 1.0),
                80.0,
            )),
            car_body: Rc::new(Material::new(
                v(0.0, 0.0, 0.0),
                v(0.0, 0.0, 0.0),
                v(0.8, 0.05, 0.05),
                v(0.6, 0.6, 0.6),
                60.0,
            )),
        }
    }
}

pub struct World {
    pub materials: WorldMaterials,

    race_track: EntityGroup,
    trees: Vec<EntityGroup>,
    lamps: Vec<EntityGroup>,
    buildings: Vec<EntityGroup>,
    ground: EntityGroup,
    car: MobileEntity,

    /// bbox[0] holds the min corner, bbox[1] the max.
    bbox: [Vector3<f32>; 2],
    sun_direction: Vector3<f32>,
    sun_intensity: Vector3<f32>,
    lamp_positions: [Vector3<f32>; MAX_LAMPS],
    lamp_intensity: Vector3<f32>,

    photo_position: Vector3<f32>,
    observer_position: Vector3<f32>,

    initialized: Cell<bool>,
}

impl World {
    /// Loads a scene description file and builds the world from it.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let description = SceneDescription::load(path)?;
        Self::from_description(&description)
    }

    pub fn from_description(description: &SceneDescription) -> Result<Self> {
        description.validate()?;
        let materials = WorldMaterials::demo();

        let bbox = [
            Vector3::new(description.bbox[0], description.bbox[1], description.bbox[2]),
            Vector3::new(description.bbox[3], description.bbox[4], description.bbox[5]),
        ];

        let ground = build_ground(&bbox, &materials);
        let race_track = build_track(description, &materials);

        let trees = description
            .trees
            .iter()
            .map(|t| {
                let mut group =
                    builders::tree(t.height, Rc::clone(&materials.trunk), Rc::clone(&materials.tree_top));
                group.group_transform =
                    Matrix4::from_translation(Vector3::from(t.position)) * group.group_transform;
                group
            })
            .collect();

        let buildings = description
            .buildings
            .iter()
            .map(|b| {
                let mut base = [[0.0f32; 3]; 4];
                let mut heights = [0.0f32; 4];
                for (i, corner) in b.outline.chunks(4).enumerate() {
                    base[i] = [corner[0], corner[1], corner[2]];
                    heights[i] = corner[3];
                }
                let mesh = Rc::new(Mesh::new(crate::gfx::geometry::generate_building(
                    base, heights,
                )));
                EntityGroup::from_node(
                    SceneNode::new(mesh).with_material(Rc::clone(&materials.building)),
                )
            })
            .collect();

        let mut lamp_positions = [Vector3::new(0.0, 0.0, 0.0); MAX_LAMPS];
        let mut lamps = Vec::new();
        if description.lamps.len() > MAX_LAMPS {
            log::warn!(
                "scene describes {} lamps; only the first {MAX_LAMPS} are lit",
                description.lamps.len()
            );
        }
        for (i, lamp) in description.lamps.iter().take(MAX_LAMPS).enumerate() {
            // The light point sits just below the head of the post.
            lamp_positions[i] = Vector3::new(lamp.position[0], lamp.height - 0.5, lamp.position[2]);

            let mut group = builders::lamp(
                lamp.height,
                Rc::clone(&materials.lamp_post),
                Rc::clone(&materials.lamp_head),
            );
            group.group_transform =
                Matrix4::from_translation(lamp_positions[i]) * group.group_transform;
            lamps.push(group);
        }

        let mut car = MobileEntity::new(build_car_body(description, &materials));
        car.update_state(
            Some(Vector3::from(description.start_pyr)),
            Some(Vector3::from(description.start_position)),
            Some(Vector3::new(0.0, 1.0, 0.0)),
        );

        Ok(Self {
            materials,
            race_track,
            trees,
            lamps,
            buildings,
            ground,
            car,
            bbox,
            sun_direction: Vector3::from(description.weather.sun_light_direction),
            sun_intensity: Vector3::from(description.weather.sun_intensity),
            lamp_positions,
            lamp_intensity: Vector3::from(description.lamp_intensity),
            photo_position: Vector3::from(description.photo_position),
            observer_position: Vector3::from(description.observer_position),
            initialized: Cell::new(false),
        })
    }

    /// Ensures every mesh in the forest has GPU-resident buffers. Latched:
    /// runs once no matter how often it is called.
    pub fn init(&self, ctx: &RenderContext) {
        if self.initialized.get() {
            return;
        }
        self.race_track.init_meshes(ctx);
        for group in self.trees.iter().chain(&self.lamps).chain(&self.buildings) {
            group.init_meshes(ctx);
        }
        self.ground.init_meshes(ctx);
        self.car.init_meshes(ctx);
        self.initialized.set(true);
        log::info!("world meshes initialized");
    }

    /// Renders the whole forest, initializing meshes on the first call.
    pub fn render(&self, ctx: &RenderContext, sink: &mut dyn DrawSink) {
        if !self.initialized.get() {
            self.init(ctx);
        }
        self.submit_draws(sink);
    }

    /// Traverses the forest in the fixed order track, trees, lamps,
    /// buildings, ground, car. Order has no semantic effect; nothing is
    /// transparent.
    fn submit_draws(&self, sink: &mut dyn DrawSink) {
        let ambient = Matrix4::identity();
        self.race_track.render(ambient, sink);
        for group in &self.trees {
            group.render(ambient, sink);
        }
        for group in &self.lamps {
            group.render(ambient, sink);
        }
        for group in &self.buildings {
            group.render(ambient, sink);
        }
        self.ground.render(ambient, sink);
        self.car.render(ambient, sink);
    }

    pub fn car(&self) -> &MobileEntity {
        &self.car
    }

    pub fn car_mut(&mut self) -> &mut MobileEntity {
        &mut self.car
    }

    pub fn bbox(&self) -> [Vector3<f32>; 2] {
        self.bbox
    }

    pub fn sun_direction(&self) -> Vector3<f32> {
        self.sun_direction
    }

    pub fn sun_intensity(&self) -> Vector3<f32> {
        self.sun_intensity
    }

    pub fn lamp_positions(&self) -> &[Vector3<f32>; MAX_LAMPS] {
        &self.lamp_positions
    }

    /// How many of the lamp slots are actually populated.
    pub fn lamp_count(&self) -> usize {
        self.lamps.len()
    }

    pub fn lamp_intensity(&self) -> Vector3<f32> {
        self.lamp_intensity
    }

    pub fn photo_position(&self) -> Vector3<f32> {
        self.photo_position
    }

    pub fn observer_position(&self) -> Vector3<f32> {
        self.observer_position
    }
}

/// The ground quad sits a hair below the bounding box floor so the track
/// never z-fights with it.
fn build_ground(bbox: &[Vector3<f32>; 2], materials: &WorldMaterials) -> EntityGroup {
    let y = bbox[0].y - 1e-3;
    let corners = [
        [bbox[1].x, y, bbox[0].z],
        [bbox[1].x, y, bbox[1].z],
        [bbox[0].x, y, bbox[1].z],
        [bbox[0].x, y, bbox[0].z],
    ];
    EntityGroup::from_node(
        SceneNode::new(Mesh::quad(corners)).with_material(Rc::clone(&materials.ground)),
    )
}

fn build_track(description: &SceneDescription, materials: &WorldMaterials) -> EntityGroup {
    let ribbon = crate::gfx::geometry::generate_track_ribbon(
        &description.track.left_curb,
        &description.track.right_curb,
    );

    let size = TRACK_NORMAL_MAP_SIZE;
    let height_map = procedural::generate_height_map(size, size);
    let pixels = procedural::generate_normal_map(size, size, &height_map);
    let mesh = Rc::new(Mesh::new(ribbon).with_normal_map(NormalMapImage {
        width: size,
        height: size,
        pixels,
    }));

    EntityGroup::from_node(
        SceneNode::new(mesh)
            .with_material(Rc::clone(&materials.track))
            .with_normal_map(true),
    )
}

fn build_car_body(description: &SceneDescription, materials: &WorldMaterials) -> EntityGroup {
    if let Some(path) = &description.car_model {
        match load_obj_mesh(std::path::Path::new(path)) {
            Ok(data) => return builders::obj_car(data, Rc::clone(&materials.car_body)),
            Err(e) => {
                log::warn!("falling back to the built-in car body: {e}");
            }
        }
    }
    builders::basic_car(Rc::clone(&materials.car_body))
}

#[cfg(test)]
mod tests {
    use super::description::*;
    use super::*;
    use crate::gfx::scene::DrawCall;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn sample_description() -> SceneDescription {
        SceneDescription {
            bbox: vec![-50.0, 0.0, -50.0, 50.0, 10.0, 50.0],
            track: TrackDescription {
                left_curb: vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 10.0, 0.0, 10.0, 0.0, 0.0, 10.0],
                right_curb: vec![2.0, 0.0, 2.0, 8.0, 0.0, 2.0, 8.0, 0.0, 8.0, 2.0, 0.0, 8.0],
            },
            trees: vec![TreeDescription {
                height: 6.0,
                position: [5.0, 0.0, -5.0],
            }],
            buildings: vec![BuildingDescription {
                outline: vec![
                    0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 2.0, 4.0, 2.0, 0.0, 2.0, 6.0, 2.0, 0.0, 0.0, 6.0,
                ],
            }],
            start_pyr: [0.0, 0.5, 0.0],
            start_position: [1.0, 0.0, 1.0],
            photo_position: [0.0, 8.0, 20.0],
            observer_position: [0.0, 15.0, 30.0],
            weather: WeatherDescription {
                sun_light_direction: [-0.3, -1.0, -0.2],
                sun_intensity: [0.9, 0.9, 0.8],
            },
            lamps: vec![
                LampDescription {
                    position: [3.0, 0.0, 3.0],
                    height: 4.0,
                },
                LampDescription {
                    position: [-3.0, 0.0, -3.0],
                    height: 4.0,
                },
            ],
            lamp_intensity: [6.0, 6.0, 5.0],
            car_model: None,
        }
    }

    #[test]
    fn single_tree_scenario() {
        let world = World::from_description(&sample_description()).unwrap();
        assert_eq!(world.trees.len(), 1);

        // Trunk cylinder and canopy cone with the standard proportions.
        let tree = &world.trees[0];
        assert_eq!(tree.len(), 3);
        let trunk = tree.nodes()[0].mesh.circular_profile().unwrap();
        assert_eq!((trunk.radius, trunk.slices), (0.4, 8));
        let canopy = tree.nodes()[1].mesh.circular_profile().unwrap();
        assert_eq!((canopy.radius, canopy.slices), (1.0, 16));

        // Extents before the upright transform: trunk h/3, canopy h/1.5.
        let local_height = |node: &crate::gfx::scene::SceneNode| {
            node.mesh
                .data()
                .positions
                .iter()
                .map(|p| p[2])
                .fold(f32::MIN, f32::max)
        };
        assert_eq!(local_height(&tree.nodes()[0]), 2.0);
        assert_eq!(local_height(&tree.nodes()[1]), 4.0);

        // The group transform carries the tree to its described position.
        let mut calls: Vec<DrawCall> = Vec::new();
        tree.render(Matrix4::identity(), &mut calls);
        let base = calls[0].transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(base.x, 5.0, epsilon = 1e-4);
        assert_relative_eq!(base.z, -5.0, epsilon = 1e-4);
    }

    #[test]
    fn forest_renders_every_entity_exactly_once() {
        let world = World::from_description(&sample_description()).unwrap();
        let mut calls: Vec<DrawCall> = Vec::new();
        world.submit_draws(&mut calls);

        // track 1 + tree 3 + lamps 2x2 + building 1 + ground 1 + car 1
        assert_eq!(calls.len(), 11);
    }

    #[test]
    fn track_node_enables_its_normal_map() {
        let world = World::from_description(&sample_description()).unwrap();
        let node = &world.race_track.nodes()[0];
        assert!(node.normal_map);
        assert!(node.mesh.has_normal_map());
    }

    #[test]
    fn tree_tops_share_one_material_instance() {
        let mut description = sample_description();
        description.trees.push(TreeDescription {
            height: 4.0,
            position: [8.0, 0.0, 8.0],
        });
        let world = World::from_description(&description).unwrap();

        let top0 = world.trees[0].nodes()[1].material.as_ref().unwrap();
        let top1 = world.trees[1].nodes()[1].material.as_ref().unwrap();
        assert!(Rc::ptr_eq(top0, top1));
        assert!(Rc::ptr_eq(top0, &world.materials.tree_top));
    }

    #[test]
    fn car_starts_where_the_description_says() {
        let world = World::from_description(&sample_description()).unwrap();
        let car = world.car();
        assert_relative_eq!(car.position().x, 1.0);
        assert_relative_eq!(car.position().z, 1.0);
        assert_relative_eq!(car.yaw(), 0.5);
        assert_relative_eq!(car.direction().x, 0.5f32.cos());
        assert_relative_eq!(car.direction().z, 0.5f32.sin());
    }

    #[test]
    fn lamp_lights_sit_below_the_heads() {
        let world = World::from_description(&sample_description()).unwrap();
        assert_eq!(world.lamp_positions()[0], Vector3::new(3.0, 3.5, 3.0));
        assert_eq!(world.lamp_positions()[1], Vector3::new(-3.0, 3.5, -3.0));
        // Unused slots stay at the origin.
        assert_eq!(world.lamp_positions()[2], Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn excess_lamps_are_dropped_at_the_limit() {
        let mut description = sample_description();
        description.lamps = (0..15)
            .map(|i| LampDescription {
                position: [i as f32, 0.0, 0.0],
                height: 4.0,
            })
            .collect();
        let world = World::from_description(&description).unwrap();
        assert_eq!(world.lamps.len(), MAX_LAMPS);
    }

    #[test]
    fn ground_sits_just_below_the_bbox_floor() {
        let world = World::from_description(&sample_description()).unwrap();
        let mut calls: Vec<DrawCall> = Vec::new();
        world.ground.render(Matrix4::identity(), &mut calls);
        let mesh = &calls[0].mesh;
        for p in &mesh.data().positions {
            assert_relative_eq!(p[1], -1e-3, epsilon = 1e-6);
        }
    }
}
