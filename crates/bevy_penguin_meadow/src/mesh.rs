use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology};
use bevy::prelude::*;

/// A `size` × `size` grid centred on the origin, `segments` quads per side,
/// lifted by `heights` (row-major, `(segments + 1)²` entries, rows along +Z).
/// Missing heights count as zero.
pub fn ground_mesh(heights: &[f32], segments: usize, size: f32) -> Mesh {
    let segments = segments.max(1);
    let side = segments + 1;
    let step = size / segments as f32;
    let half = size * 0.5;

    let mut positions: Vec<Vec3> = Vec::with_capacity(side * side);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let y = heights.get(row * side + col).copied().unwrap_or(0.0);
            positions.push(Vec3::new(
                -half + col as f32 * step,
                y,
                -half + row as f32 * step,
            ));
            uvs.push([col as f32 / segments as f32, row as f32 / segments as f32]);
        }
    }

    let quads = grid_quads(segments);
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_indices(Indices::U32(triangulate_quads(&quads)));
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_NORMAL,
        compute_normals_from_quads(&positions, &quads),
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        positions.iter().map(|p| [p.x, p.y, p.z]).collect::<Vec<_>>(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh
}

/// Quads wound so their normals face +Y.
fn grid_quads(segments: usize) -> Vec<[u32; 4]> {
    let side = segments + 1;
    let mut quads = Vec::with_capacity(segments * segments);
    for row in 0..segments {
        for col in 0..segments {
            let a = (row * side + col) as u32;
            let b = ((row + 1) * side + col) as u32;
            let c = ((row + 1) * side + col + 1) as u32;
            let d = (row * side + col + 1) as u32;
            quads.push([a, b, c, d]);
        }
    }
    quads
}

fn triangulate_quads(quads: &[[u32; 4]]) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads.len() * 6);
    for &[a, b, c, d] in quads {
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    indices
}

fn compute_normals_from_quads(positions: &[Vec3], quads: &[[u32; 4]]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for quad in quads {
        let [a, b, c, d] = quad.map(|i| i as usize);
        let pa = positions[a];
        let n0 = (positions[b] - pa).cross(positions[c] - pa);
        let n1 = (positions[c] - pa).cross(positions[d] - pa);
        let normal = (n0 + n1).normalize_or_zero();
        for idx in [a, b, c, d] {
            normals[idx] += normal;
        }
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or_zero())
        .map(|n| [n.x, n.y, n.z])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::mesh::VertexAttributeValues;

    #[test]
    fn flat_grid_points_up() {
        let quads = grid_quads(4);
        assert_eq!(quads.len(), 16);
        let positions: Vec<Vec3> = (0..25)
            .map(|i| Vec3::new((i % 5) as f32, 0.0, (i / 5) as f32))
            .collect();
        for n in compute_normals_from_quads(&positions, &quads) {
            assert!((n[1] - 1.0).abs() < 1e-6, "normal {n:?}");
        }
    }

    #[test]
    fn triangulation_keeps_winding() {
        assert_eq!(triangulate_quads(&[[0, 1, 2, 3]]), [0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn ground_is_centred_and_lifted() {
        let heights: Vec<f32> = (0..9).map(|i| i as f32 * 0.05).collect();
        let mesh = ground_mesh(&heights, 2, 200.0);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], [-100.0, 0.0, -100.0]);
        assert_eq!(positions[8], [100.0, 0.4, 100.0]);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(24));
    }
}
