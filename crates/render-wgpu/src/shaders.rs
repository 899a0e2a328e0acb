/// WGSL shader for the standard material.
///
/// Lambert diffuse plus a roughness-driven Blinn-Phong lobe, ambient light
/// scaled by the AO map, tangent-space normal maps through a cotangent frame
/// built from screen-space derivatives, height-map vertex displacement and
/// range fog.
pub const STANDARD_SHADER: &str = r#"
const MAX_DIRECTIONAL: u32 = 2u;
const MAX_POINT: u32 = 4u;

struct Frame {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
    ambient: vec4<f32>,
    directional_color: array<vec4<f32>, 2>,
    directional_direction: array<vec4<f32>, 2>,
    point_position: array<vec4<f32>, 4>,
    point_color: array<vec4<f32>, 4>,
    counts: vec4<u32>,
};

struct Material {
    color: vec4<f32>,
    params: vec4<f32>,
    displacement: vec4<f32>,
    flags: vec4<u32>,
};

struct Mesh {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

@group(1) @binding(0) var<uniform> material: Material;
@group(1) @binding(1) var material_sampler: sampler;
@group(1) @binding(2) var color_map: texture_2d<f32>;
@group(1) @binding(3) var ao_map: texture_2d<f32>;
@group(1) @binding(4) var alpha_map: texture_2d<f32>;
@group(1) @binding(5) var normal_map: texture_2d<f32>;
@group(1) @binding(6) var roughness_map: texture_2d<f32>;
@group(1) @binding(7) var metalness_map: texture_2d<f32>;
@group(1) @binding(8) var displacement_map: texture_2d<f32>;

@group(2) @binding(0) var<uniform> mesh: Mesh;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    // Texture space: V grows downwards, repeat applied.
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let uv = vec2<f32>(in.uv.x, 1.0 - in.uv.y) * material.displacement.zw;
    var local = in.position;
    if (material.flags.z != 0u) {
        let h = textureSampleLevel(displacement_map, material_sampler, uv, 0.0).r;
        local = local + normalize(in.normal) * (h * material.displacement.x + material.displacement.y);
    }
    let world = mesh.model * vec4<f32>(local, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = normalize((mesh.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = uv;
    return out;
}

fn perturb_normal(position: vec3<f32>, normal: vec3<f32>, uv: vec2<f32>, map_normal: vec3<f32>, scale: f32) -> vec3<f32> {
    // The frame is built in V-up space to match the mesh UVs.
    let st = vec2<f32>(uv.x, -uv.y);
    let q0 = dpdx(position);
    let q1 = dpdy(position);
    let st0 = dpdx(st);
    let st1 = dpdy(st);
    let q1perp = cross(q1, normal);
    let q0perp = cross(normal, q0);
    let t = q1perp * st0.x + q0perp * st1.x;
    let b = q1perp * st0.y + q0perp * st1.y;
    let det = max(dot(t, t), dot(b, b));
    let inv = select(inverseSqrt(det), 0.0, det == 0.0);
    let m = vec3<f32>(map_normal.xy * scale, map_normal.z);
    return normalize(t * (m.x * inv) + b * (m.y * inv) + normal * m.z);
}

fn direct(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, radiance: vec3<f32>, diffuse: vec3<f32>, specular: vec3<f32>, shininess: f32) -> vec3<f32> {
    let ndl = max(dot(n, l), 0.0);
    let h = normalize(l + v);
    let ndh = max(dot(n, h), 0.0);
    let lobe = specular * (shininess + 2.0) / 8.0 * pow(ndh, shininess);
    return radiance * ndl * (diffuse + lobe);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Every sample happens in uniform control flow; flags only select.
    let base = textureSample(color_map, material_sampler, in.uv);
    let alpha_sample = textureSample(alpha_map, material_sampler, in.uv).g;
    let ao_sample = textureSample(ao_map, material_sampler, in.uv).r;
    let rough_sample = textureSample(roughness_map, material_sampler, in.uv).g;
    let metal_sample = textureSample(metalness_map, material_sampler, in.uv).b;
    let map_normal = textureSample(normal_map, material_sampler, in.uv).xyz * 2.0 - 1.0;

    let geometric = normalize(in.world_normal);
    let perturbed = perturb_normal(in.world_position, geometric, in.uv, map_normal, material.params.w);
    let n = select(geometric, perturbed, material.flags.y != 0u);

    let albedo = base.rgb * material.color.rgb;
    var alpha = material.color.a * base.a;
    alpha = alpha * select(1.0, alpha_sample, material.flags.x != 0u);
    let ao = (ao_sample - 1.0) * material.params.z + 1.0;
    let roughness = clamp(material.params.x * rough_sample, 0.04, 1.0);
    let metalness = clamp(material.params.y * metal_sample, 0.0, 1.0);

    let diffuse = albedo * (1.0 - metalness);
    let specular = mix(vec3<f32>(0.04), albedo, metalness);
    let r2 = roughness * roughness;
    let shininess = max(2.0 / max(r2 * r2, 1e-4) - 2.0, 0.0);
    let v = normalize(frame.camera_position.xyz - in.world_position);

    var color = frame.ambient.rgb * diffuse * ao;
    for (var i = 0u; i < min(frame.counts.x, MAX_DIRECTIONAL); i = i + 1u) {
        let l = normalize(frame.directional_direction[i].xyz);
        color = color + direct(n, v, l, frame.directional_color[i].rgb, diffuse, specular, shininess);
    }
    for (var i = 0u; i < min(frame.counts.y, MAX_POINT); i = i + 1u) {
        let to_light = frame.point_position[i].xyz - in.world_position;
        let d = length(to_light);
        let range = frame.point_position[i].w;
        let decay = frame.point_color[i].w;
        var falloff = 1.0;
        if (range > 0.0 && decay > 0.0) {
            falloff = pow(clamp(1.0 - d / range, 0.0, 1.0), decay);
        }
        let l = to_light / max(d, 1e-4);
        color = color + direct(n, v, l, frame.point_color[i].rgb * falloff, diffuse, specular, shininess);
    }

    if (frame.fog_color.w > 0.0) {
        let depth = distance(frame.camera_position.xyz, in.world_position);
        let fog = smoothstep(frame.fog_range.x, frame.fog_range.y, depth);
        color = mix(color, frame.fog_color.rgb, fog);
    }
    return vec4<f32>(color, alpha);
}
"#;
