//! WGSL program generation.
//!
//! Every scene runs the same fragment body, [`RAYMARCH_WGSL`]. What differs is
//! a block of `const` declarations generated from the scene's
//! [`RaymarchConfig`]; disabled features are switched off with `HAS_*` flags
//! and filled with their inert values so the body always type-checks.

use glam::Vec3;

use crate::config::{
    CoreConfig, DiskConfig, GlowConfig, GravityConfig, JetConfig, PhotonRingConfig,
    RaymarchConfig, TorusConfig,
};

/// Uniform block, full-screen vertex stage and the noise library.
pub const COMMON_WGSL: &str = r#"
struct Uniforms {
    time: f32,
    resolution: vec2f,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) position: vec4f,
    @location(0) uv: vec2f,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var corners = array<vec2f, 6>(
        vec2f(-1.0, -1.0), vec2f(1.0, -1.0), vec2f(-1.0, 1.0),
        vec2f(-1.0, 1.0), vec2f(1.0, -1.0), vec2f(1.0, 1.0)
    );

    var output: VertexOutput;
    output.position = vec4f(corners[vertex_index], 0.0, 1.0);
    output.uv = corners[vertex_index] * 0.5 + 0.5;
    return output;
}

fn hash(p: vec3f) -> f32 {
    var p3 = fract(p * 0.1031);
    p3 += dot(p3, p3.yzx + 33.33);
    return fract((p3.x + p3.y) * p3.z);
}

fn noise(p: vec3f) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * (3.0 - 2.0 * f);

    return mix(mix(mix(hash(i + vec3f(0.0, 0.0, 0.0)), hash(i + vec3f(1.0, 0.0, 0.0)), u.x),
                   mix(hash(i + vec3f(0.0, 1.0, 0.0)), hash(i + vec3f(1.0, 1.0, 0.0)), u.x), u.y),
               mix(mix(hash(i + vec3f(0.0, 0.0, 1.0)), hash(i + vec3f(1.0, 0.0, 1.0)), u.x),
                   mix(hash(i + vec3f(0.0, 1.0, 1.0)), hash(i + vec3f(1.0, 1.0, 1.0)), u.x), u.y), u.z);
}

fn fbm(p: vec3f) -> f32 {
    var value = 0.0;
    var amplitude = 0.5;
    var st = p;
    for (var i = 0; i < 5; i++) {
        value += amplitude * noise(st);
        st = st * 2.0;
        amplitude *= 0.5;
    }
    return value;
}

fn warp(p: vec3f) -> f32 {
    let q = vec3f(fbm(p), fbm(p + vec3f(5.2, 1.3, 2.8)), fbm(p + vec3f(1.8, 9.2, 5.5)));
    return fbm(p + 4.0 * q);
}
"#;

/// Shared raymarch fragment stage. Requires the generated constant block.
pub const RAYMARCH_WGSL: &str = r#"
const DISK_TURBULENT: u32 = 0u;
const DISK_NEBULA: u32 = 1u;

fn tilt_matrix() -> mat3x3f {
    let c = cos(CAMERA_TILT);
    let s = sin(CAMERA_TILT);
    return mat3x3f(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
}

fn jet_emission(pos: vec3f, view: vec3f, time: f32) -> vec3f {
    let dist_to_axis = length(pos.xz);
    let along = abs(pos.y);
    if (along >= JET_LENGTH || dist_to_axis >= JET_WIDTH * (1.0 + along * JET_FLARE)) {
        return vec3f(0.0);
    }

    var beaming = 1.0;
    if (JET_DOPPLER != 0.0) {
        beaming = 1.0 + JET_DOPPLER * dot(normalize(pos), view);
    }
    let turbulence = fbm(pos * JET_TURBULENCE_SCALE - vec3f(0.0, time * JET_FLOW_SPEED, 0.0));
    let structure = JET_NOISE_BIAS + JET_NOISE_GAIN * turbulence;
    let profile = (JET_PROFILE_BASE + along * JET_PROFILE_SPREAD) * JET_PROFILE_SCALE;
    let density = smoothstep(profile, 0.0, dist_to_axis) * structure * exp(-along * JET_FALLOFF);
    let color = JET_COLOR + JET_COLOR_NOISE * turbulence;
    return color * density * MARCH_STEP_SIZE * beaming * JET_GAIN;
}

fn turbulent_disk(pos: vec3f, r: f32, inner: f32, outer: f32, time: f32) -> vec3f {
    let dist_to_plane = abs(pos.y);
    if (dist_to_plane >= DISK_HALF_THICKNESS || r <= inner || r >= outer) {
        return vec3f(0.0);
    }

    let angle = atan2(pos.z, pos.x);
    let rotated = angle + time * (DISK_SPIN / sqrt(r));
    let turbulence = warp(vec3f(r, rotated, pos.y) * DISK_WARP_SCALE);
    var rings = 1.0;
    if (DISK_HAS_RINGS) {
        rings = 0.5 + 0.5 * sin(r * DISK_RING_FREQUENCY);
    }

    let radial_fade = smoothstep(inner, inner + DISK_INNER_RAMP, r)
        * (1.0 - smoothstep(outer - DISK_OUTER_RAMP, outer, r));
    let vertical_fade = 1.0 - smoothstep(0.0, DISK_VERTICAL_FALLOFF, dist_to_plane);
    let density = turbulence * rings * radial_fade * vertical_fade * DISK_DENSITY_SCALE;

    let temperature = (outer - r) / (outer - inner);
    let color = mix(DISK_OUTER_COLOR, DISK_INNER_COLOR, pow(temperature, DISK_TEMPERATURE_EXPONENT))
        + temperature * DISK_WHITE_POINT;
    return color * density * MARCH_STEP_SIZE * DISK_GAIN;
}

fn nebula_disk(pos: vec3f, r: f32, time: f32) -> vec3f {
    let dist_to_plane = abs(pos.y);
    if (dist_to_plane >= DISK_HALF_THICKNESS || r >= DISK_RADIUS) {
        return vec3f(0.0);
    }

    let angle = atan2(pos.z, pos.x);
    let spiral = angle + r * DISK_TWIST + time * DISK_SPIN;
    let swirl = vec3f(sin(spiral * DISK_ARMS), pos.y * DISK_VERTICAL_SWIRL, cos(spiral * DISK_ARMS));
    let cloud = fbm(pos * DISK_NOISE_SCALE + swirl + vec3f(0.0, time, 0.0));
    let density = smoothstep(DISK_HALF_THICKNESS, 0.0, dist_to_plane)
        * smoothstep(DISK_RADIUS, DISK_CORE_RADIUS, r)
        * cloud;

    let color = mix(DISK_INNER_COLOR, DISK_OUTER_COLOR, saturate(r / DISK_PALETTE_RADIUS));
    return color * density * MARCH_STEP_SIZE * DISK_GAIN;
}

@fragment
fn fs_main(@location(0) uv: vec2f) -> @location(0) vec4f {
    let aspect = uniforms.resolution.x / uniforms.resolution.y;
    let p = (uv - 0.5) * 2.0 * vec2f(aspect, 1.0);

    let time = uniforms.time * CAMERA_TIME_SCALE;
    let angle = time * CAMERA_ORBIT_RATE;
    let ro = vec3f(
        CAMERA_DISTANCE * cos(angle),
        CAMERA_DISTANCE * CAMERA_HEIGHT_RATIO,
        CAMERA_DISTANCE * sin(angle)
    );
    let w = normalize(vec3f(0.0) - ro);
    let u = normalize(cross(w, vec3f(0.0, 1.0, 0.0)));
    let v = cross(u, w);

    var rd = normalize(p.x * u + p.y * v + CAMERA_FOCAL_LENGTH * w);
    var curr_pos = ro;

    let event_horizon = GRAVITY_HORIZON_FACTOR * GRAVITY_MASS;
    let disk_inner = event_horizon * DISK_INNER_FACTOR;
    let disk_outer = event_horizon * DISK_OUTER_FACTOR;

    var col = vec3f(0.0);
    var glow = 0.0;

    for (var i = 0; i < MARCH_STEPS; i++) {
        var pos = curr_pos;
        if (HAS_TILT) {
            pos = tilt_matrix() * curr_pos;
        }
        let r = length(pos);

        if (HAS_GRAVITY) {
            if (r < event_horizon) {
                col = vec3f(0.0);
                break;
            }
            let force = (GRAVITY_MASS * GRAVITY_LENSING) / (r * r + GRAVITY_SOFTENING);
            rd = normalize(rd - normalize(pos) * force * MARCH_STEP_SIZE);
        }

        if (HAS_CORE) {
            let core_density = 1.0 / (r * r * CORE_CONCENTRATION + CORE_SOFTENING);
            col += CORE_COLOR * core_density * MARCH_STEP_SIZE * CORE_GAIN;
        }

        if (HAS_GRAVITY && HAS_PHOTON_RING) {
            let dist_to_horizon = r - event_horizon;
            if (dist_to_horizon < RING_WIDTH && dist_to_horizon > 0.0) {
                col += RING_COLOR * (RING_INTENSITY / (dist_to_horizon + RING_INTENSITY));
            }
        }

        if (HAS_JET) {
            col += jet_emission(pos, w, time);
        }

        if (DISK_KIND == DISK_TURBULENT) {
            col += turbulent_disk(pos, r, disk_inner, disk_outer, time);
        } else if (DISK_KIND == DISK_NEBULA) {
            col += nebula_disk(pos, r, time);
        }

        if (HAS_TORUS) {
            if (r > disk_outer && r < disk_outer * TORUS_EXTENT && abs(pos.y) < r * TORUS_OPENING) {
                let dust = fbm(pos * TORUS_NOISE_SCALE) * TORUS_DENSITY;
                col = mix(col, TORUS_COLOR, dust * MARCH_STEP_SIZE * TORUS_ABSORPTION);
            }
        }

        if (HAS_GLOW) {
            glow += GLOW_INTENSITY / (r * r + GLOW_SOFTENING);
        }

        curr_pos += rd * MARCH_STEP_SIZE;

        if (r > ESCAPE_RADIUS) {
            let star = pow(noise(rd * STAR_FREQUENCY), STAR_SHARPNESS);
            col += vec3f(star * STAR_BRIGHTNESS);
            break;
        }
    }

    if (HAS_GLOW) {
        col += GLOW_COLOR * glow * GLOW_SCALE;
    }
    if (HAS_CONTRAST) {
        col = pow(col, vec3f(TONE_CONTRAST));
    }
    col = 1.0 - exp(-col * TONE_EXPOSURE);

    return vec4f(col, 1.0);
}
"#;

/// Formats an `f32` as a WGSL float literal.
///
/// `Debug` always keeps a fractional part or exponent, so `500.0` never turns
/// into the integer literal `500`.
fn float_literal(value: f32) -> String {
    format!("{value:?}")
}

fn vec3_literal(value: Vec3) -> String {
    format!(
        "vec3f({}, {}, {})",
        float_literal(value.x),
        float_literal(value.y),
        float_literal(value.z)
    )
}

/// Accumulates `const` declarations.
#[derive(Default)]
struct ConstBlock {
    source: String,
}

impl ConstBlock {
    fn push(&mut self, name: &str, ty: &str, value: String) {
        self.source
            .push_str(&format!("const {name}: {ty} = {value};\n"));
    }

    fn float(&mut self, name: &str, value: f32) {
        self.push(name, "f32", float_literal(value));
    }

    fn vec3(&mut self, name: &str, value: Vec3) {
        self.push(name, "vec3f", vec3_literal(value));
    }

    fn flag(&mut self, name: &str, value: bool) {
        self.push(name, "bool", value.to_string());
    }

    fn int(&mut self, name: &str, value: i32) {
        self.push(name, "i32", value.to_string());
    }

    fn uint(&mut self, name: &str, value: u32) {
        self.push(name, "u32", format!("{value}u"));
    }
}

fn push_disk(block: &mut ConstBlock, disk: &DiskConfig) {
    match disk {
        DiskConfig::Turbulent(disk) => {
            block.uint("DISK_KIND", 0);
            block.float("DISK_HALF_THICKNESS", disk.half_thickness);
            block.float("DISK_SPIN", disk.spin);
            block.vec3("DISK_INNER_COLOR", disk.inner_color);
            block.vec3("DISK_OUTER_COLOR", disk.outer_color);
            block.float("DISK_GAIN", disk.gain);

            block.float("DISK_INNER_FACTOR", disk.inner_factor);
            block.float("DISK_OUTER_FACTOR", disk.outer_factor);
            block.vec3("DISK_WARP_SCALE", disk.warp_scale);
            block.flag("DISK_HAS_RINGS", disk.ring_frequency.is_some());
            block.float("DISK_RING_FREQUENCY", disk.ring_frequency.unwrap_or(0.0));
            block.float("DISK_INNER_RAMP", disk.inner_ramp);
            block.float("DISK_OUTER_RAMP", disk.outer_ramp);
            block.float("DISK_VERTICAL_FALLOFF", disk.vertical_falloff);
            block.float("DISK_DENSITY_SCALE", disk.density_scale);
            block.float("DISK_TEMPERATURE_EXPONENT", disk.temperature_exponent);
            block.float("DISK_WHITE_POINT", disk.white_point);

            block.float("DISK_RADIUS", 0.0);
            block.float("DISK_CORE_RADIUS", 0.0);
            block.float("DISK_TWIST", 0.0);
            block.float("DISK_ARMS", 0.0);
            block.float("DISK_VERTICAL_SWIRL", 0.0);
            block.float("DISK_NOISE_SCALE", 0.0);
            block.float("DISK_PALETTE_RADIUS", 1.0);
        }
        DiskConfig::Nebula(disk) => {
            block.uint("DISK_KIND", 1);
            block.float("DISK_HALF_THICKNESS", disk.half_thickness);
            block.float("DISK_SPIN", disk.spin);
            block.vec3("DISK_INNER_COLOR", disk.inner_color);
            block.vec3("DISK_OUTER_COLOR", disk.outer_color);
            block.float("DISK_GAIN", disk.gain);

            block.float("DISK_INNER_FACTOR", 0.0);
            block.float("DISK_OUTER_FACTOR", 0.0);
            block.vec3("DISK_WARP_SCALE", Vec3::ZERO);
            block.flag("DISK_HAS_RINGS", false);
            block.float("DISK_RING_FREQUENCY", 0.0);
            block.float("DISK_INNER_RAMP", 0.0);
            block.float("DISK_OUTER_RAMP", 0.0);
            block.float("DISK_VERTICAL_FALLOFF", 1.0);
            block.float("DISK_DENSITY_SCALE", 0.0);
            block.float("DISK_TEMPERATURE_EXPONENT", 1.0);
            block.float("DISK_WHITE_POINT", 0.0);

            block.float("DISK_RADIUS", disk.radius);
            block.float("DISK_CORE_RADIUS", disk.core_radius);
            block.float("DISK_TWIST", disk.twist);
            block.float("DISK_ARMS", disk.arms);
            block.float("DISK_VERTICAL_SWIRL", disk.vertical_swirl);
            block.float("DISK_NOISE_SCALE", disk.noise_scale);
            block.float("DISK_PALETTE_RADIUS", disk.palette_radius);
        }
    }
}

/// Constant block describing `config`, one declaration per line.
pub fn const_header(config: &RaymarchConfig) -> String {
    let mut block = ConstBlock::default();

    let camera = &config.camera;
    block.float("CAMERA_TIME_SCALE", camera.time_scale);
    block.float("CAMERA_ORBIT_RATE", camera.orbit_rate);
    block.float("CAMERA_DISTANCE", camera.distance);
    block.float("CAMERA_HEIGHT_RATIO", camera.height_ratio);
    block.float("CAMERA_FOCAL_LENGTH", camera.focal_length);
    block.flag("HAS_TILT", camera.tilt.is_some());
    block.float("CAMERA_TILT", camera.tilt.unwrap_or(0.0));

    // Budgets are a few hundred steps; saturate rather than wrap.
    block.int(
        "MARCH_STEPS",
        i32::try_from(config.march.steps).unwrap_or(i32::MAX),
    );
    block.float("MARCH_STEP_SIZE", config.march.step_size);
    block.float("ESCAPE_RADIUS", config.march.escape_radius);

    let gravity = config.gravity.unwrap_or(GravityConfig::DISABLED);
    block.flag("HAS_GRAVITY", config.gravity.is_some());
    block.float("GRAVITY_MASS", gravity.mass);
    block.float("GRAVITY_HORIZON_FACTOR", gravity.horizon_factor);
    block.float("GRAVITY_LENSING", gravity.lensing_strength);
    block.float("GRAVITY_SOFTENING", gravity.softening);

    let ring = config.photon_ring.unwrap_or(PhotonRingConfig::DISABLED);
    block.flag("HAS_PHOTON_RING", config.photon_ring.is_some());
    block.float("RING_WIDTH", ring.width);
    block.float("RING_INTENSITY", ring.intensity);
    block.vec3("RING_COLOR", ring.color);

    let core = config.core.unwrap_or(CoreConfig::DISABLED);
    block.flag("HAS_CORE", config.core.is_some());
    block.float("CORE_CONCENTRATION", core.concentration);
    block.float("CORE_SOFTENING", core.softening);
    block.vec3("CORE_COLOR", core.color);
    block.float("CORE_GAIN", core.gain);

    let jet = config.jet.unwrap_or(JetConfig::DISABLED);
    block.flag("HAS_JET", config.jet.is_some());
    block.float("JET_LENGTH", jet.length);
    block.float("JET_WIDTH", jet.width);
    block.float("JET_FLARE", jet.flare);
    block.float("JET_PROFILE_BASE", jet.profile_base);
    block.float("JET_PROFILE_SPREAD", jet.profile_spread);
    block.float("JET_PROFILE_SCALE", jet.profile_scale);
    block.float("JET_TURBULENCE_SCALE", jet.turbulence_scale);
    block.float("JET_FLOW_SPEED", jet.flow_speed);
    block.float("JET_NOISE_BIAS", jet.noise_bias);
    block.float("JET_NOISE_GAIN", jet.noise_gain);
    block.float("JET_FALLOFF", jet.falloff);
    block.vec3("JET_COLOR", jet.color);
    block.vec3("JET_COLOR_NOISE", jet.color_noise);
    block.float("JET_DOPPLER", jet.doppler);
    block.float("JET_GAIN", jet.gain);

    push_disk(&mut block, &config.disk);

    let torus = config.torus.unwrap_or(TorusConfig::DISABLED);
    block.flag("HAS_TORUS", config.torus.is_some());
    block.float("TORUS_EXTENT", torus.extent);
    block.float("TORUS_OPENING", torus.opening);
    block.float("TORUS_NOISE_SCALE", torus.noise_scale);
    block.float("TORUS_DENSITY", torus.density);
    block.float("TORUS_ABSORPTION", torus.absorption);
    block.vec3("TORUS_COLOR", torus.color);

    let glow = config.glow.unwrap_or(GlowConfig::DISABLED);
    block.flag("HAS_GLOW", config.glow.is_some());
    block.float("GLOW_INTENSITY", glow.intensity);
    block.float("GLOW_SOFTENING", glow.softening);
    block.vec3("GLOW_COLOR", glow.color);
    block.float("GLOW_SCALE", glow.scale);

    block.float("STAR_FREQUENCY", config.stars.frequency);
    block.float("STAR_SHARPNESS", config.stars.sharpness);
    block.float("STAR_BRIGHTNESS", config.stars.brightness);

    block.float("TONE_EXPOSURE", config.tone.exposure);
    block.flag("HAS_CONTRAST", config.tone.contrast.is_some());
    block.float("TONE_CONTRAST", config.tone.contrast.unwrap_or(1.0));

    block.source
}

/// Fragment stage for `config`: its constant block followed by [`RAYMARCH_WGSL`].
pub fn fragment_source(config: &RaymarchConfig) -> String {
    let mut source = const_header(config);
    source.push_str(RAYMARCH_WGSL);
    source
}

/// Complete WGSL module (vertex and fragment stages) for `config`.
pub fn program_source(config: &RaymarchConfig) -> String {
    let mut source = String::from(COMMON_WGSL);
    source.push_str(&fragment_source(config));
    source
}
