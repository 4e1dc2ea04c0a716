//! Shared drawable meshes with lazy, idempotent GPU upload.
//!
//! A [`Mesh`] is tessellated data plus optional capabilities: a
//! [`CircularProfile`] tag (so cap builders can recover a cone's or
//! cylinder's rim without type inspection) and a baked normal-map raster
//! (the track). Meshes are shared between scene nodes via `Rc`; the GPU
//! side lives behind a `RefCell` so `init` can run lazily on a shared
//! handle. The renderer is single-threaded, so this is sound.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::gfx::geometry::{self, MeshData};
use crate::gfx::scene::vertex::Vertex3D;

use super::texture::TextureResource;

/// Radius/slice-count capability carried by circular meshes, so a matching
/// cap disk can be built without inspecting the mesh's concrete shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularProfile {
    pub radius: f32,
    pub slices: u32,
}

/// A normal map raster baked at mesh build time and uploaded on `init`.
#[derive(Debug, Clone)]
pub struct NormalMapImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub pixels: Vec<u8>,
}

/// Everything the GPU holds for one mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    normal_map: Option<NormalMapBinding>,
}

struct NormalMapBinding {
    _texture: TextureResource,
    bind_group: wgpu::BindGroup,
}

/// Explicit handle to the GPU objects mesh initialization needs; threaded
/// through `init` calls instead of any process-wide context lookup.
pub struct RenderContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Layout of the normal-map bind group (texture + sampler), owned by
    /// the render engine.
    pub normal_map_layout: &'a wgpu::BindGroupLayout,
}

pub struct Mesh {
    data: MeshData,
    profile: Option<CircularProfile>,
    normal_map: Option<NormalMapImage>,
    gpu: RefCell<Option<GpuMesh>>,
}

impl Mesh {
    pub fn new(data: MeshData) -> Self {
        Self {
            data,
            profile: None,
            normal_map: None,
            gpu: RefCell::new(None),
        }
    }

    pub fn with_profile(mut self, radius: f32, slices: u32) -> Self {
        self.profile = Some(CircularProfile { radius, slices });
        self
    }

    pub fn with_normal_map(mut self, map: NormalMapImage) -> Self {
        self.normal_map = Some(map);
        self
    }

    /// An open cone, tagged with its circular profile.
    pub fn cone(radius: f32, height: f32, slices: u32) -> Rc<Self> {
        Rc::new(Self::new(geometry::generate_cone(radius, height, slices)).with_profile(radius, slices))
    }

    /// An open cylinder, tagged with its circular profile.
    pub fn cylinder(radius: f32, height: f32, slices: u32) -> Rc<Self> {
        Rc::new(
            Self::new(geometry::generate_cylinder(radius, height, slices))
                .with_profile(radius, slices),
        )
    }

    pub fn disk(radius: f32, slices: u32) -> Rc<Self> {
        Rc::new(Self::new(geometry::generate_disk(radius, slices)).with_profile(radius, slices))
    }

    pub fn cube(side: f32) -> Rc<Self> {
        Rc::new(Self::new(geometry::generate_cube(side)))
    }

    pub fn quad(corners: [[f32; 3]; 4]) -> Rc<Self> {
        Rc::new(Self::new(geometry::generate_quad(corners)))
    }

    /// The fallback drawable for nodes built without a mesh.
    pub fn unit_cube() -> Rc<Self> {
        Self::cube(1.0)
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    /// The circular rim of this mesh, if it has one.
    pub fn circular_profile(&self) -> Option<CircularProfile> {
        self.profile
    }

    pub fn has_normal_map(&self) -> bool {
        self.normal_map.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.gpu.borrow().is_some()
    }

    /// Uploads vertex/index buffers (and the normal-map texture, when
    /// present). Idempotent: a second call on an initialized mesh is a
    /// no-op.
    pub fn init(&self, ctx: &RenderContext) {
        if self.is_initialized() {
            return;
        }

        let vertices = self.interleave();
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            ctx.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            ctx.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&self.data.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let normal_map = self.normal_map.as_ref().map(|map| {
            let texture = TextureResource::create_from_rgba(
                ctx.device,
                ctx.queue,
                &map.pixels,
                map.width,
                map.height,
                "Mesh Normal Map",
            );
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Mesh Normal Map Bind Group"),
                layout: ctx.normal_map_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ],
            });
            NormalMapBinding {
                _texture: texture,
                bind_group,
            }
        });

        *self.gpu.borrow_mut() = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: self.data.indices.len() as u32,
            normal_map,
        });
    }

    /// Issues the draw call for this mesh.
    ///
    /// Binds the mesh's own normal map at group 2 when it has one, the
    /// engine's flat fallback otherwise. Fails if `init` has not run.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        fallback_normal_map: &wgpu::BindGroup,
    ) -> Result<()> {
        let gpu = self.gpu.borrow();
        let gpu = gpu
            .as_ref()
            .ok_or_else(|| Error::precondition("cannot draw a mesh before init"))?;

        let normal_map = gpu
            .normal_map
            .as_ref()
            .map(|n| &n.bind_group)
            .unwrap_or(fallback_normal_map);
        pass.set_bind_group(2, normal_map, &[]);
        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        Ok(())
    }

    fn interleave(&self) -> Vec<Vertex3D> {
        (0..self.data.positions.len())
            .map(|i| Vertex3D {
                position: self.data.positions[i],
                normal: self.data.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.data.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

/// Loads the first model of an OBJ file into mesh data.
///
/// Used for the car body. Materials in the file are ignored; the scene
/// assigns its own.
pub fn load_obj_mesh(path: &Path) -> Result<MeshData> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| Error::resource(format!("failed to load OBJ {}: {e}", path.display())))?;

    let model = models
        .first()
        .ok_or_else(|| Error::resource(format!("OBJ {} contains no models", path.display())))?;
    let mesh = &model.mesh;

    let mut data = MeshData::new();
    for i in 0..mesh.positions.len() / 3 {
        data.positions.push([
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ]);
        if mesh.normals.len() == mesh.positions.len() {
            data.normals.push([
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]);
        }
    }
    if data.normals.is_empty() {
        data.normals = calculate_vertex_normals(&data.positions, &mesh.indices);
    }
    data.indices = mesh.indices.clone();

    Ok(data)
}

/// Area-weighted vertex normals for models that ship without them.
fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    use cgmath::{InnerSpace, Vector3, Zero};

    let mut normals = vec![Vector3::<f32>::zero(); positions.len()];
    for tri in indices.chunks(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let v0 = Vector3::from(positions[i0]);
        let v1 = Vector3::from(positions[i1]);
        let v2 = Vector3::from(positions[i2]);
        let face = (v1 - v0).cross(v2 - v0);
        normals[i0] += face;
        normals[i1] += face;
        normals[i2] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_profile_survives_construction() {
        let cone = Mesh::cone(1.0, 4.0, 16);
        assert_eq!(
            cone.circular_profile(),
            Some(CircularProfile {
                radius: 1.0,
                slices: 16
            })
        );
        let cube = Mesh::cube(0.5);
        assert_eq!(cube.circular_profile(), None);
    }

    #[test]
    fn meshes_start_uninitialized() {
        let mesh = Mesh::unit_cube();
        assert!(!mesh.is_initialized());
    }

    #[test]
    fn vertex_normal_fallback_is_unit_length() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let normals = calculate_vertex_normals(&positions, &[0, 1, 2]);
        for n in normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }
}
