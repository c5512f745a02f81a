/// WGSL shader for light-reactive meshes (Blinn-Phong, directional lights).
pub const PHONG_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct DirectionalLight {
    // xyz: unit vector towards the light
    direction: vec4<f32>,
    // rgb: colour * intensity
    color: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<DirectionalLight, MAX_LIGHTS>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
    // rgb: specular colour, a: shininess
    @location(8) specular: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) specular: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = world_normal;
    out.color = instance.color.rgb * vertex.color;
    out.specular = instance.specular;
    return out;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var normal = normalize(in.world_normal);
    if (!front) {
        normal = -normal;
    }
    let view_dir = normalize(frame.camera_position.xyz - in.world_position);

    var lit = frame.ambient.rgb * in.color;
    for (var i = 0u; i < min(frame.light_count.x, MAX_LIGHTS); i = i + 1u) {
        let light = frame.lights[i];
        let l = light.direction.xyz;
        let n_dot_l = max(dot(normal, l), 0.0);
        let half_dir = normalize(l + view_dir);
        var spec = 0.0;
        if (n_dot_l > 0.0) {
            spec = pow(max(dot(normal, half_dir), 0.0), max(in.specular.a, 1.0));
        }
        lit = lit + light.color.rgb * (in.color * n_dot_l + in.specular.rgb * spec);
    }
    return vec4<f32>(lit, 1.0);
}
"#;

/// WGSL shader for unlit line helpers such as the axes.
pub const LINE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_line(vertex: VertexInput, instance: InstanceInput) -> LineOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    var out: LineOutput;
    out.clip_position = frame.view_proj * model * vec4<f32>(vertex.position, 1.0);
    out.color = instance.color.rgb * vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;
