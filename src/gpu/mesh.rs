//! Unit sphere mesh shared by every object and the tool.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Generate a UV sphere of radius 1 centred at the origin.
///
/// `stacks` runs pole to pole, `sectors` around the equator. Returns
/// vertices and a counter-clockwise triangle list.
pub fn uv_sphere(stacks: u32, sectors: u32) -> (Vec<Vertex>, Vec<u32>) {
    let stacks = stacks.max(2);
    let sectors = sectors.max(3);

    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        // From +Z pole to -Z pole
        let theta = PI * i as f32 / stacks as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for j in 0..=sectors {
            let phi = TAU * j as f32 / sectors as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let p = [sin_t * cos_p, sin_t * sin_p, cos_t];
            vertices.push(Vertex {
                position: p,
                normal: p,
            });
        }
    }

    let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
    let row = sectors + 1;
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * row + j;
            let b = a + row;
            if i != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    (vertices, indices)
}
