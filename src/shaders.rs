//! Built-in background shaders.
//!
//! All presets share the pass-through vertex stage and read the standard
//! uniforms from [`crate::uniforms`].

use serde::{Deserialize, Serialize};

use crate::program::ShaderSource;

pub const PASS_THROUGH_VERTEX: &str = r#"
precision mediump float;
attribute vec2 vertPosition;
varying vec2 vertFragPosition;

void main() {
    vertFragPosition = vertPosition;
    gl_Position = vec4(vertPosition, 0.0, 1.0);
}
"#;

/// Per-fragment hash noise over the quad, faint alpha.
pub const STATIC_FRAGMENT: &str = r#"
precision mediump float;
varying vec2 vertFragPosition;
uniform float u_time;

float rand(vec2 co) {
    return fract(sin(dot(co.xy, vec2(12.9898, 78.233))) * 43758.5453);
}

void main() {
    float t = fract(u_time);
    gl_FragColor.r = rand(vertFragPosition * t * 1.0);
    gl_FragColor.g = rand(vertFragPosition * t * 2.0);
    gl_FragColor.b = rand(vertFragPosition * t * 3.0);
    gl_FragColor.a = rand(vertFragPosition * t) * 0.25;
}
"#;

/// Noise brightened along a jittered cross through the pointer.
pub const SCANLINE_FRAGMENT: &str = r#"
precision mediump float;
uniform vec2 u_mousePosition;
uniform float u_time;

#define X_RANGE 20.0
#define Y_RANGE 25.0

float rand(vec2 co) {
    return fract(sin(dot(co.xy, vec2(12.9898, 78.233))) * 43758.5453123);
}

void main() {
    float modifier = 0.2;
    float jitter = rand(u_mousePosition * u_time);
    bool inColumn = u_mousePosition.x - X_RANGE + jitter * 10.0 < gl_FragCoord.x
        && u_mousePosition.x + X_RANGE + jitter * 2.0 > gl_FragCoord.x;
    bool inRow = u_mousePosition.y - Y_RANGE + jitter * 8.0 < gl_FragCoord.y
        && u_mousePosition.y + Y_RANGE + jitter * 4.0 > gl_FragCoord.y;
    if (inColumn || inRow) {
        modifier += rand(vec2(u_time, u_time)) * 0.1;
    }

    gl_FragColor.r = rand(gl_FragCoord.xy * u_time * 1.0 * modifier);
    gl_FragColor.g = rand(gl_FragCoord.xy * u_time * 2.0 * modifier);
    gl_FragColor.b = rand(gl_FragCoord.xy * u_time * 3.0 * modifier);
    gl_FragColor.a = rand(gl_FragCoord.xy * u_time) * modifier;
}
"#;

/// Layered value noise with a wobbling halo around the pointer.
pub const HALO_FRAGMENT: &str = r#"
precision mediump float;
uniform vec2 u_resolution;
uniform vec2 u_mousePosition;
uniform float u_time;

float rand(vec2 co) {
    return fract(sin(dot(co.xy, vec2(12.9898, 78.233))) * 43758.5453123);
}

float noise(float x) {
    float i = floor(x);
    float f = fract(x);
    return mix(fract(sin(i)), fract(sin(i + 1.0)), smoothstep(0.0, 1.0, f));
}

float noise2d(vec2 co) {
    return mix(noise(co.x), noise(co.y), smoothstep(0.0, 1.0, rand(co)));
}

void main() {
    float d = distance(gl_FragCoord.xy, u_mousePosition);
    float modifier = 0.3;
    if (d + noise(d * u_time / 200.0) * 50.0 < 100.0 + noise(u_mousePosition.x * u_time) * 10.0) {
        modifier = clamp(noise(-d) * 2.0, 0.1, 0.45);
    }

    gl_FragColor.r = noise2d(gl_FragCoord.xy / 3.230 + sin(noise(u_time * 3.0)));
    gl_FragColor.g = noise2d(gl_FragCoord.xy / 42.454 + sin(noise(u_time)));
    gl_FragColor.b = noise2d(gl_FragCoord.xy / 213.54 + sin(noise(u_time / 23.0)));
    gl_FragColor.a = noise2d(gl_FragCoord.xy / 0.21456 + sin(noise(u_time / 0.1244))) * modifier;
}
"#;

/// A soft dark disc following the pointer; transparent elsewhere.
pub const GLOW_FRAGMENT: &str = r#"
precision mediump float;
uniform vec2 u_mousePosition;
uniform float u_time;

float noise(float x) {
    float i = floor(x);
    float f = fract(x);
    return mix(fract(sin(i)), fract(sin(i + 1.0)), smoothstep(0.0, 1.0, f));
}

void main() {
    float d = distance(gl_FragCoord.xy, u_mousePosition);
    if (d < 150.0) {
        gl_FragColor = vec4(0.1, 0.1, 0.1, clamp(noise(abs(sin(u_time))), 0.5, 1.0));
    } else {
        gl_FragColor = vec4(0.0);
    }
}
"#;

/// Opaque red everywhere.
pub const SOLID_RED_FRAGMENT: &str = r#"
precision mediump float;

void main() {
    gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    Static,
    Scanline,
    Halo,
    Glow,
    SolidRed,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Static,
        Preset::Scanline,
        Preset::Halo,
        Preset::Glow,
        Preset::SolidRed,
    ];

    pub fn source(self) -> ShaderSource {
        let fragment = match self {
            Preset::Static => STATIC_FRAGMENT,
            Preset::Scanline => SCANLINE_FRAGMENT,
            Preset::Halo => HALO_FRAGMENT,
            Preset::Glow => GLOW_FRAGMENT,
            Preset::SolidRed => SOLID_RED_FRAGMENT,
        };
        ShaderSource::new(PASS_THROUGH_VERTEX, fragment)
    }
}
