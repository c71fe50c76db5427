#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use shaderbg::frame::{FrameCallback, FrameId, FrameScheduler};
use shaderbg::{GraphicsApi, HarnessError, RenderTarget, ShaderStage};

struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    vertex_source: String,
    fragment_source: String,
}

#[derive(Default)]
struct FakeState {
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    buffers: HashMap<u32, Vec<f32>>,
    current: Option<u32>,
    attribute_buffer: Option<u32>,
    fail_compile: Option<(ShaderStage, String)>,
    fail_link: Option<String>,
    refuse: HashSet<&'static str>,
    viewport: [i32; 4],
    blend: bool,
    uniforms: HashMap<String, Vec<f32>>,
    draws: usize,
    pixels: Vec<[u8; 4]>,
}

const MAX_FAKE_PIXELS: usize = 1 << 24;

/// Records every call and rasterises solid-colour fragment shaders onto an
/// in-memory RGBA framebuffer sized by the last `viewport` call.
#[derive(Default)]
pub struct FakeGl {
    state: RefCell<FakeState>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_compile(&self, stage: ShaderStage, log: &str) {
        self.state.borrow_mut().fail_compile = Some((stage, log.to_owned()));
    }

    pub fn fail_link(&self, log: &str) {
        self.state.borrow_mut().fail_link = Some(log.to_owned());
    }

    /// `object` is one of `shader`, `program`, `buffer`.
    pub fn refuse_allocation(&self, object: &'static str) {
        self.state.borrow_mut().refuse.insert(object);
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_resources(&self) -> usize {
        self.live_shaders() + self.live_programs() + self.live_buffers()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    pub fn viewport_rect(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    pub fn blend_enabled(&self) -> bool {
        self.state.borrow().blend
    }

    pub fn draws(&self) -> usize {
        self.state.borrow().draws
    }

    pub fn uniform(&self, name: &str) -> Option<Vec<f32>> {
        self.state.borrow().uniforms.get(name).cloned()
    }

    pub fn pixels(&self) -> Vec<[u8; 4]> {
        self.state.borrow().pixels.clone()
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let state = self.state.borrow();
        let width = state.viewport[2] as usize;
        state.pixels[y * width + x]
    }

    fn alloc(&self, object: &'static str) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.refuse.contains(object) {
            return None;
        }
        state.next_id += 1;
        Some(state.next_id)
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Extracts the constant colour of `gl_FragColor = vec4(r, g, b, a);`.
fn solid_color(fragment: &str) -> Option<[f32; 4]> {
    let start = fragment.find("gl_FragColor = vec4(")? + "gl_FragColor = vec4(".len();
    let end = start + fragment[start..].find(')')?;
    let parts: Vec<f32> = fragment[start..end]
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b, a] => Some([*r, *g, *b, *a]),
        _ => None,
    }
}

impl GraphicsApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = String;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        let id = self.alloc("shader")?;
        self.state.borrow_mut().shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Some(id)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: &u32) {
        let mut state = self.state.borrow_mut();
        let forced = state.fail_compile.as_ref().map(|(stage, _)| *stage);
        if let Some(s) = state.shaders.get_mut(shader) {
            s.compiled = forced != Some(s.stage) && s.source.contains("void main");
        }
    }

    fn compile_status(&self, shader: &u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: &u32) -> Option<String> {
        let state = self.state.borrow();
        let s = state.shaders.get(shader)?;
        match &state.fail_compile {
            Some((stage, log)) if *stage == s.stage => Some(log.clone()),
            _ if !s.compiled => Some("ERROR: 0:1: 'main' : function not defined".to_owned()),
            _ => Some(String::new()),
        }
    }

    fn delete_shader(&self, shader: &u32) {
        self.state.borrow_mut().shaders.remove(shader);
    }

    fn create_program(&self) -> Option<u32> {
        let id = self.alloc("program")?;
        self.state
            .borrow_mut()
            .programs
            .insert(id, FakeProgram::default());
        Some(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        let mut state = self.state.borrow_mut();
        let Some((stage, source)) = state
            .shaders
            .get(shader)
            .map(|s| (s.stage, s.source.clone()))
        else {
            return;
        };
        if let Some(p) = state.programs.get_mut(program) {
            p.attached.push(*shader);
            match stage {
                ShaderStage::Vertex => p.vertex_source = source,
                ShaderStage::Fragment => p.fragment_source = source,
            }
        }
    }

    fn link_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        let forced = state.fail_link.is_some();
        if let Some(p) = state.programs.get_mut(program) {
            p.linked = !forced && p.attached.len() == 2;
        }
    }

    fn link_status(&self, program: &u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, _program: &u32) -> Option<String> {
        self.state.borrow().fail_link.clone()
    }

    fn use_program(&self, program: Option<&u32>) {
        self.state.borrow_mut().current = program.copied();
    }

    fn delete_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(program);
        if state.current == Some(*program) {
            state.current = None;
        }
    }

    fn create_buffer(&self) -> Option<u32> {
        let id = self.alloc("buffer")?;
        self.state.borrow_mut().buffers.insert(id, Vec::new());
        Some(id)
    }

    fn upload_array_buffer(&self, buffer: &u32, data: &[f32]) {
        if let Some(b) = self.state.borrow_mut().buffers.get_mut(buffer) {
            *b = data.to_vec();
        }
    }

    fn delete_buffer(&self, buffer: &u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(buffer);
        if state.attribute_buffer == Some(*buffer) {
            state.attribute_buffer = None;
        }
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let p = state.programs.get(program)?;
        p.vertex_source.contains(name).then_some(0)
    }

    fn bind_vertex_attribute(&self, buffer: &u32, _location: u32, _components: i32) {
        self.state.borrow_mut().attribute_buffer = Some(*buffer);
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<String> {
        let state = self.state.borrow();
        let p = state.programs.get(program)?;
        (p.vertex_source.contains(name) || p.fragment_source.contains(name))
            .then(|| name.to_owned())
    }

    fn uniform1f(&self, location: &String, value: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .insert(location.clone(), vec![value]);
    }

    fn uniform2f(&self, location: &String, x: f32, y: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .insert(location.clone(), vec![x, y]);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.viewport = [x, y, width, height];
        // Surfaces too large to hold in memory keep no pixels.
        let area = (width.max(0) as usize).checked_mul(height.max(0) as usize);
        state.pixels = match area {
            Some(area) if area <= MAX_FAKE_PIXELS => vec![[0, 0, 0, 0]; area],
            _ => Vec::new(),
        };
    }

    fn enable_alpha_blend(&self) {
        self.state.borrow_mut().blend = true;
    }

    fn clear(&self, color: [f32; 4]) {
        let fill = color.map(to_byte);
        for pixel in self.state.borrow_mut().pixels.iter_mut() {
            *pixel = fill;
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        state.draws += 1;

        let Some(program) = state.current.and_then(|id| state.programs.get(&id)) else {
            return;
        };
        if !program.linked {
            return;
        }
        let Some(color) = solid_color(&program.fragment_source) else {
            return;
        };
        let Some(vertices) = state
            .attribute_buffer
            .and_then(|id| state.buffers.get(&id))
            .cloned()
        else {
            return;
        };

        // The harness only draws axis-aligned quads, so coverage is the
        // bounding box of the drawn vertices.
        let drawn = vertices
            .chunks_exact(2)
            .skip(first as usize)
            .take(count as usize);
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for v in drawn {
            min_x = min_x.min(v[0]);
            max_x = max_x.max(v[0]);
            min_y = min_y.min(v[1]);
            max_y = max_y.max(v[1]);
        }

        let [_, _, width, height] = state.viewport;
        if state.pixels.len() != width.max(0) as usize * height.max(0) as usize {
            return;
        }
        let blend = state.blend;
        for y in 0..height {
            for x in 0..width {
                let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
                let ndc_y = (y as f32 + 0.5) / height as f32 * 2.0 - 1.0;
                if ndc_x < min_x || ndc_x > max_x || ndc_y < min_y || ndc_y > max_y {
                    continue;
                }
                let index = (y * width + x) as usize;
                let dst = state.pixels[index];
                let out = if blend {
                    let a = color[3];
                    [0, 1, 2, 3].map(|c| to_byte(color[c] * a + dst[c] as f32 / 255.0 * (1.0 - a)))
                } else {
                    color.map(to_byte)
                };
                state.pixels[index] = out;
            }
        }
    }
}

/// Runs queued frame callbacks only when the test says so.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<(FrameId, FrameCallback)>>,
    next: Cell<i32>,
    refuse: Cell<bool>,
    cancelled: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_requests(&self) {
        self.refuse.set(true);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn cancellations(&self) -> usize {
        self.cancelled.get()
    }

    /// Delivers one display frame at `now_ms` to everything queued before it.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback(now_ms);
        }
        count
    }

    pub fn run_frames(&self, timestamps: impl IntoIterator<Item = f64>) {
        for now in timestamps {
            self.run_frame(now);
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameId, HarnessError> {
        if self.refuse.get() {
            return Err(HarnessError::Host("requestAnimationFrame refused".into()));
        }
        let id = FrameId(self.next.get() + 1);
        self.next.set(id.0);
        self.queue.borrow_mut().push((id, callback));
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameId) {
        self.cancelled.set(self.cancelled.get() + 1);
        self.queue.borrow_mut().retain(|(queued, _)| *queued != id);
    }
}

/// A display element with a settable layout box.
pub struct FakeTarget {
    layout: Cell<(f64, f64)>,
    backing: Cell<(u32, u32)>,
}

impl FakeTarget {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            layout: Cell::new((width, height)),
            backing: Cell::new((300, 150)),
        }
    }

    pub fn set_layout(&self, width: f64, height: f64) {
        self.layout.set((width, height));
    }

    pub fn backing(&self) -> (u32, u32) {
        self.backing.get()
    }
}

impl RenderTarget for FakeTarget {
    fn layout_size(&self) -> (f64, f64) {
        self.layout.get()
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.backing.set((width, height));
    }
}

/// Frame timestamps of a steady display at `hz`, starting at `start_ms`.
pub fn display_frames(start_ms: f64, hz: f64, count: usize) -> Vec<f64> {
    let period = 1000.0 / hz;
    (0..count).map(|i| start_ms + i as f64 * period).collect()
}
