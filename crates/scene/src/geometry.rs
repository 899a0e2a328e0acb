//! Primitive shapes and their triangle tessellation.
//!
//! Vertex layouts, UVs and winding follow the usual conventions of retained
//! mode engines: counter-clockwise front faces, V pointing up, one UV set that
//! also serves ambient-occlusion lookups.

use std::f32::consts::{PI, TAU};

/// A primitive shape description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box centered on the origin, one quad per face.
    Box { width: f32, height: f32, depth: f32 },
    /// Cone with its apex on +Y and a closed base, centered on the origin.
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
    /// Subdivided plane in XY facing +Z.
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// UV sphere.
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn push(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
    }

    /// Emit the two triangles of every cell of a `(grid_x + 1) x (grid_y + 1)`
    /// vertex grid starting at `base`.
    fn grid_indices(&mut self, base: u32, grid_x: u32, grid_y: u32) {
        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = base + ix + row * iy;
                let b = base + ix + row * (iy + 1);
                let c = base + (ix + 1) + row * (iy + 1);
                let d = base + (ix + 1) + row * iy;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
}

impl Geometry {
    pub fn tessellate(&self) -> MeshData {
        let mut mesh = MeshData::default();
        match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => {
                // (u axis, v axis, w axis, u dir, v dir, extent u, extent v, extent w)
                let faces: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
                    (2, 1, 0, -1.0, -1.0, depth, height, width),
                    (2, 1, 0, 1.0, -1.0, depth, height, -width),
                    (0, 2, 1, 1.0, 1.0, width, depth, height),
                    (0, 2, 1, 1.0, -1.0, width, depth, -height),
                    (0, 1, 2, 1.0, -1.0, width, height, depth),
                    (0, 1, 2, -1.0, -1.0, width, height, -depth),
                ];
                for (u, v, w, udir, vdir, eu, ev, ew) in faces {
                    let base = mesh.vertex_count() as u32;
                    for iy in 0..=1u32 {
                        let y = iy as f32 * ev - ev / 2.0;
                        for ix in 0..=1u32 {
                            let x = ix as f32 * eu - eu / 2.0;
                            let mut p = [0.0; 3];
                            p[u] = x * udir;
                            p[v] = y * vdir;
                            p[w] = ew / 2.0;
                            let mut n = [0.0; 3];
                            n[w] = if ew > 0.0 { 1.0 } else { -1.0 };
                            mesh.push(p, n, [ix as f32, 1.0 - iy as f32]);
                        }
                    }
                    mesh.grid_indices(base, 1, 1);
                }
            }
            Geometry::Cone {
                radius,
                height,
                radial_segments,
            } => {
                let segments = radial_segments.max(3);
                let half = height / 2.0;
                let slope = radius / height;

                // Side: apex row then base row.
                for iy in 0..=1u32 {
                    let v = iy as f32;
                    let r = v * radius;
                    for ix in 0..=segments {
                        let u = ix as f32 / segments as f32;
                        let theta = u * TAU;
                        let (sin, cos) = theta.sin_cos();
                        let n = glam::Vec3::new(sin, slope, cos).normalize();
                        mesh.push(
                            [r * sin, -v * height + half, r * cos],
                            n.to_array(),
                            [u, 1.0 - v],
                        );
                    }
                }
                let row = segments + 1;
                for ix in 0..segments {
                    // The apex row is degenerate, so only the lower triangle.
                    let b = ix + row;
                    let c = ix + 1 + row;
                    let d = ix + 1;
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }

                // Base cap: one center vertex per segment, then the rim.
                let center_start = mesh.vertex_count() as u32;
                for _ in 0..segments {
                    mesh.push([0.0, -half, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]);
                }
                let rim_start = mesh.vertex_count() as u32;
                for ix in 0..=segments {
                    let theta = ix as f32 / segments as f32 * TAU;
                    let (sin, cos) = theta.sin_cos();
                    mesh.push(
                        [radius * sin, -half, radius * cos],
                        [0.0, -1.0, 0.0],
                        [cos * 0.5 + 0.5, 0.5 - sin * 0.5],
                    );
                }
                for ix in 0..segments {
                    let c = center_start + ix;
                    let i = rim_start + ix;
                    mesh.indices.extend_from_slice(&[i + 1, i, c]);
                }
            }
            Geometry::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => {
                let gx = width_segments.max(1);
                let gy = height_segments.max(1);
                let seg_w = width / gx as f32;
                let seg_h = height / gy as f32;
                for iy in 0..=gy {
                    let y = iy as f32 * seg_h - height / 2.0;
                    for ix in 0..=gx {
                        let x = ix as f32 * seg_w - width / 2.0;
                        mesh.push(
                            [x, -y, 0.0],
                            [0.0, 0.0, 1.0],
                            [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                        );
                    }
                }
                mesh.grid_indices(0, gx, gy);
            }
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                let ws = width_segments.max(3);
                let hs = height_segments.max(2);
                for iy in 0..=hs {
                    let v = iy as f32 / hs as f32;
                    let u_offset = if iy == 0 {
                        0.5 / ws as f32
                    } else if iy == hs {
                        -0.5 / ws as f32
                    } else {
                        0.0
                    };
                    for ix in 0..=ws {
                        let u = ix as f32 / ws as f32;
                        let p = glam::Vec3::new(
                            -radius * (u * TAU).cos() * (v * PI).sin(),
                            radius * (v * PI).cos(),
                            radius * (u * TAU).sin() * (v * PI).sin(),
                        );
                        let n = p.try_normalize().unwrap_or(glam::Vec3::Y);
                        mesh.push(p.to_array(), n.to_array(), [u + u_offset, 1.0 - v]);
                    }
                }
                let row = ws + 1;
                for iy in 0..hs {
                    for ix in 0..ws {
                        let a = iy * row + ix + 1;
                        let b = iy * row + ix;
                        let c = (iy + 1) * row + ix;
                        let d = (iy + 1) * row + ix + 1;
                        if iy != 0 {
                            mesh.indices.extend_from_slice(&[a, b, d]);
                        }
                        if iy != hs - 1 {
                            mesh.indices.extend_from_slice(&[b, c, d]);
                        }
                    }
                }
            }
        }
        mesh
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Cone { .. } => "cone",
            Geometry::Plane { .. } => "plane",
            Geometry::Sphere { .. } => "sphere",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn v(p: [f32; 3]) -> Vec3 {
        Vec3::from_array(p)
    }

    /// Every triangle's winding must agree with its vertex normals.
    fn assert_front_faces_outward(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let face = (v(mesh.positions[b]) - v(mesh.positions[a]))
                .cross(v(mesh.positions[c]) - v(mesh.positions[a]));
            if face.length() < 1e-9 {
                continue;
            }
            let normal = v(mesh.normals[a]) + v(mesh.normals[b]) + v(mesh.normals[c]);
            assert!(face.dot(normal) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn box_has_four_vertices_per_face() {
        let mesh = Geometry::Box {
            width: 4.0,
            height: 2.8,
            depth: 4.0,
        }
        .tessellate();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        let max_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 1.4).abs() < 1e-6);
        assert_front_faces_outward(&mesh);
    }

    #[test]
    fn four_sided_cone_is_a_pyramid() {
        let mesh = Geometry::Cone {
            radius: 3.5,
            height: 1.0,
            radial_segments: 4,
        }
        .tessellate();
        // 2 side rows of 5, 4 cap centers, 5 rim vertices.
        assert_eq!(mesh.vertex_count(), 19);
        // 4 side triangles + 4 cap triangles.
        assert_eq!(mesh.index_count(), 24);
        let apex = mesh.positions[0];
        assert_eq!(apex, [0.0, 0.5, 0.0]);
        assert_front_faces_outward(&mesh);
    }

    #[test]
    fn plane_grid_counts() {
        let mesh = Geometry::Plane {
            width: 2.5,
            height: 2.5,
            width_segments: 100,
            height_segments: 100,
        }
        .tessellate();
        assert_eq!(mesh.vertex_count(), 101 * 101);
        assert_eq!(mesh.index_count(), 100 * 100 * 6);
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert_eq!(mesh.uvs[0], [0.0, 1.0]);
        assert_eq!(mesh.positions[0], [-1.25, 1.25, 0.0]);
        assert_front_faces_outward(&mesh);
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = Geometry::Sphere {
            radius: 1.0,
            width_segments: 16,
            height_segments: 16,
        }
        .tessellate();
        assert_eq!(mesh.vertex_count(), 17 * 17);
        // Pole rows contribute one triangle per segment, others two.
        assert_eq!(mesh.index_count(), (16 * 14 * 2 + 16 * 2) * 3);
        for p in &mesh.positions {
            assert!((v(*p).length() - 1.0).abs() < 1e-5);
        }
        assert_front_faces_outward(&mesh);
    }

    #[test]
    fn indices_stay_in_bounds() {
        for g in [
            Geometry::Box {
                width: 0.6,
                height: 0.8,
                depth: 0.2,
            },
            Geometry::Cone {
                radius: 1.0,
                height: 2.0,
                radial_segments: 8,
            },
            Geometry::Plane {
                width: 20.0,
                height: 20.0,
                width_segments: 1,
                height_segments: 1,
            },
        ] {
            let mesh = g.tessellate();
            let n = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|&i| i < n), "{}", g.kind_name());
        }
    }
}
