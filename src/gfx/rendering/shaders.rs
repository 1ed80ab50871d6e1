//! Built-in WGSL programs
//!
//! Both programs read the same [`DrawUniform`](crate::gfx::resources::draw_bindings::DrawUniform)
//! block at group 0. The surface program also samples the group 1 textures.

macro_rules! draw_uniform_wgsl {
    () => {
        r#"
struct DrawUniform {
    view_position: vec4<f32>,
    view_proj: mat4x4<f32>,
    world: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    shadow_view_proj: mat4x4<f32>,
    reflection_view_proj: mat4x4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    ambient: vec4<f32>,
    sun_direction: vec4<f32>,
    sun_diffuse: vec4<f32>,
    sun_specular: vec4<f32>,
    point_position: array<vec4<f32>, 4>,
    point_diffuse: array<vec4<f32>, 4>,
    point_specular: array<vec4<f32>, 4>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
    clip_plane: vec4<f32>,
    uv_transform: vec4<f32>,
    flags: vec4<f32>,
    counts: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};
"#
    };
}

/// Lit, textured, fogged surface with shadow, reflection and clip plane support
pub const SURFACE_SHADER: &str = concat!(
    draw_uniform_wgsl!(),
    r#"
@group(1) @binding(0) var diffuse_texture: texture_2d<f32>;
@group(1) @binding(1) var diffuse_sampler: sampler;
@group(1) @binding(2) var shadow_map: texture_depth_2d;
@group(1) @binding(3) var shadow_sampler: sampler_comparison;
@group(1) @binding(4) var reflection_map: texture_2d<f32>;
@group(1) @binding(5) var reflection_sampler: sampler;

const SHADOW_BIAS: f32 = 0.002;
const REFLECTION_STRENGTH: f32 = 0.5;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world_position = draw.world * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = draw.view_proj * world_position;
    out.world_position = world_position.xyz;
    out.world_normal = (draw.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv * draw.uv_transform.zw + draw.uv_transform.xy;
    return out;
}

// Texture coordinates and depth of a world position seen through `view_proj`
fn project(view_proj: mat4x4<f32>, p: vec3<f32>) -> vec3<f32> {
    let clip = view_proj * vec4<f32>(p, 1.0);
    let ndc = clip.xyz / clip.w;
    return vec3<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5, ndc.z);
}

fn shadow_factor(p: vec3<f32>) -> f32 {
    let coords = project(draw.shadow_view_proj, p);
    let lit = textureSampleCompareLevel(shadow_map, shadow_sampler, coords.xy, coords.z - SHADOW_BIAS);
    let outside = any(coords.xy < vec2<f32>(0.0)) || any(coords.xy > vec2<f32>(1.0)) || coords.z > 1.0;
    return select(lit, 1.0, outside || draw.flags.y < 0.5);
}

fn blinn_phong(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>, diffuse: vec3<f32>, specular: vec3<f32>) -> array<vec3<f32>, 2> {
    let h = normalize(l + v);
    let d = diffuse * max(dot(n, l), 0.0);
    let s = specular * pow(max(dot(n, h), 0.0), draw.specular.w);
    return array<vec3<f32>, 2>(d, s);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(diffuse_texture, diffuse_sampler, in.uv);
    let albedo = texel * draw.diffuse;
    let reflection_coords = project(draw.reflection_view_proj, in.world_position);
    let reflected = textureSampleLevel(reflection_map, reflection_sampler, reflection_coords.xy, 0.0).rgb;
    let shadow = shadow_factor(in.world_position);

    var color = albedo.rgb;
    if (draw.flags.x > 0.5) {
        let n = normalize(in.world_normal);
        let v = normalize(draw.view_position.xyz - in.world_position);
        var diffuse = draw.ambient.rgb;
        var specular = vec3<f32>(0.0);

        if (draw.sun_direction.w > 0.5) {
            let sun = blinn_phong(n, normalize(-draw.sun_direction.xyz), v, draw.sun_diffuse.rgb, draw.sun_specular.rgb);
            diffuse += sun[0] * shadow;
            specular += sun[1] * shadow;
        }

        let count = u32(draw.counts.x);
        for (var i = 0u; i < count; i++) {
            let to_light = draw.point_position[i].xyz - in.world_position;
            let to_light_length = length(to_light);
            let range = max(draw.point_position[i].w, 0.0001);
            let attenuation = pow(clamp(1.0 - to_light_length / range, 0.0, 1.0), draw.point_diffuse[i].w);
            let lamp = blinn_phong(n, to_light / max(to_light_length, 0.0001), v, draw.point_diffuse[i].rgb, draw.point_specular[i].rgb);
            diffuse += lamp[0] * attenuation;
            specular += lamp[1] * attenuation;
        }

        color = color * diffuse + specular * draw.specular.rgb;
    }

    if (draw.flags.z > 0.5) {
        color = mix(color, reflected, REFLECTION_STRENGTH);
    }

    if (draw.fog_color.w > 0.5) {
        let eye_distance = length(draw.view_position.xyz - in.world_position);
        let span = max(draw.fog_range.y - draw.fog_range.x, 0.0001);
        let amount = clamp((eye_distance - draw.fog_range.x) / span, 0.0, 1.0);
        color = mix(color, draw.fog_color.rgb, amount);
    }

    if (draw.flags.w > 0.5 && dot(draw.clip_plane.xyz, in.world_position) + draw.clip_plane.w < 0.0) {
        discard;
    }

    return vec4<f32>(color, albedo.a);
}
"#
);

/// Depth-only program for the directional shadow pass
pub const SHADOW_SHADER: &str = concat!(
    draw_uniform_wgsl!(),
    r#"
@vertex
fn vs_main(in: VertexInput) -> @builtin(position) vec4<f32> {
    return draw.view_proj * draw.world * vec4<f32>(in.position, 1.0);
}
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programs_export_entry_points() {
        assert!(SURFACE_SHADER.contains("fn vs_main"));
        assert!(SURFACE_SHADER.contains("fn fs_main"));
        assert!(SHADOW_SHADER.contains("fn vs_main"));
        assert!(!SHADOW_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn test_programs_share_the_uniform_block() {
        let block = draw_uniform_wgsl!();
        assert!(SURFACE_SHADER.starts_with(block));
        assert!(SHADOW_SHADER.starts_with(block));
    }
}
