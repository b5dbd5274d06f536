//! A [`Gpu`] that records every call and tracks enough state to check
//! binding symmetry and object lifetimes without a GL context.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use render_trait::ShaderStage;

use crate::gpu::Gpu;

const ATTRIBS: [(&str, u32); 3] = [
    ("vertexPosition", 0),
    ("vertexColor", 1),
    ("vertexTexCoord", 2),
];
const UNIFORMS: [(&str, u32); 3] = [("translation", 10), ("projection", 11), ("texSampler", 12)];

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    Uniform1i(Option<u32>, i32),
    Uniform2f(Option<u32>, [f32; 2]),
    UniformMatrix4(Option<u32>, [f32; 16]),
    CreateVertexArray(u32),
    DeleteVertexArray(u32),
    BindVertexArray(Option<u32>),
    CreateBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer(u32, Option<u32>),
    BufferData {
        target: u32,
        len: usize,
        data: Vec<u8>,
    },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    DrawElements {
        mode: u32,
        count: i32,
        element_type: u32,
    },
    CreateTexture(u32),
    DeleteTexture(u32),
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    TexImage {
        width: i32,
        height: i32,
        len: usize,
    },
    TexParameter(u32, i32),
    Enable(u32),
    Disable(u32),
    BlendFunc(u32, u32),
    Scissor(i32, i32, i32, i32),
    Viewport(i32, i32, i32, i32),
    Clear([f32; 4]),
}

#[derive(Default)]
struct Program {
    attached: Vec<u32>,
    linked_source: String,
    ints: HashMap<u32, i32>,
    vec2s: HashMap<u32, [f32; 2]>,
    mat4s: HashMap<u32, [f32; 16]>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    shaders: HashMap<u32, String>,
    programs: HashMap<u32, Program>,
    buffers: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    textures: HashSet<u32>,
    double_deletes: Vec<u32>,
    enabled: HashSet<u32>,
    attrib_arrays: BTreeSet<u32>,
    vertex_array: Option<u32>,
    bound_buffers: HashMap<u32, Option<u32>>,
    texture: Option<u32>,
    program: Option<u32>,
    fail_compile: Option<String>,
    fail_link: bool,
    fail_texture: bool,
}

impl State {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn compiles(&self, shader: u32) -> bool {
        match (&self.fail_compile, self.shaders.get(&shader)) {
            (Some(needle), Some(source)) => !source.contains(needle.as_str()),
            _ => true,
        }
    }
}

/// Clones share one recording, so a test can keep a handle after moving the
/// GPU into a renderer.
#[derive(Clone, Default)]
pub struct RecordingGpu {
    state: Rc<RefCell<State>>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Fail compilation of any shader whose source contains `needle`
    pub fn fail_compile_containing(&self, needle: &str) {
        self.state.borrow_mut().fail_compile = Some(needle.to_owned());
    }

    pub fn fail_link(&self, fail: bool) {
        self.state.borrow_mut().fail_link = fail;
    }

    pub fn fail_textures(&self, fail: bool) {
        self.state.borrow_mut().fail_texture = fail;
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

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Ids passed to a delete call while not alive
    pub fn double_deletes(&self) -> Vec<u32> {
        self.state.borrow().double_deletes.clone()
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().vertex_array
    }

    pub fn bound_buffer(&self, target: u32) -> Option<u32> {
        self.state
            .borrow()
            .bound_buffers
            .get(&target)
            .copied()
            .flatten()
    }

    pub fn bound_texture(&self) -> Option<u32> {
        self.state.borrow().texture
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().program
    }

    pub fn enabled_attrib_arrays(&self) -> Vec<u32> {
        self.state.borrow().attrib_arrays.iter().copied().collect()
    }

    pub fn draw_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DrawElements { .. }))
            .count()
    }

    pub fn uniform_i32(&self, program: u32, location: u32) -> Option<i32> {
        let state = self.state.borrow();
        state.programs.get(&program)?.ints.get(&location).copied()
    }

    pub fn uniform_vec2(&self, program: u32, location: u32) -> Option<[f32; 2]> {
        let state = self.state.borrow();
        state.programs.get(&program)?.vec2s.get(&location).copied()
    }

    pub fn uniform_mat4(&self, program: u32, location: u32) -> Option<[f32; 16]> {
        let state = self.state.borrow();
        state.programs.get(&program)?.mat4s.get(&location).copied()
    }

    fn forget(&self, live: impl FnOnce(&mut State) -> bool, id: u32) {
        let mut state = self.state.borrow_mut();
        if !live(&mut *state) {
            state.double_deletes.push(id);
        }
    }

    /// Apply a uniform write to the program in use, like GL does
    fn with_current(&self, location: Option<&u32>, f: impl FnOnce(&mut Program, u32)) {
        let mut state = self.state.borrow_mut();
        let Some(id) = state.program else { return };
        if let (Some(program), Some(loc)) = (state.programs.get_mut(&id), location) {
            f(program, *loc);
        }
    }
}

impl Gpu for RecordingGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.shaders.insert(id, String::new());
        state.calls.push(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) {
        self.state
            .borrow_mut()
            .shaders
            .insert(shader, source.to_owned());
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().compiles(shader)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.state.borrow().compiles(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error".to_owned()
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.forget(|s| s.shaders.remove(&shader).is_some(), shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.programs.insert(id, Program::default());
        state.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        {
            let mut state = self.state.borrow_mut();
            let source: String = state
                .programs
                .get(&program)
                .map(|p| p.attached.clone())
                .unwrap_or_default()
                .iter()
                .filter_map(|s| state.shaders.get(s).cloned())
                .collect();
            if let Some(p) = state.programs.get_mut(&program) {
                p.linked_source = source;
            }
        }
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        !self.state.borrow().fail_link
    }

    fn program_info_log(&self, _program: u32) -> String {
        if self.state.borrow().fail_link {
            "error: vertex output fragColor not written".to_owned()
        } else {
            String::new()
        }
    }

    fn delete_program(&self, program: u32) {
        self.forget(|s| s.programs.remove(&program).is_some(), program);
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().program = program;
        self.record(Call::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let linked = &state.programs.get(&program)?.linked_source;
        ATTRIBS
            .iter()
            .find(|(n, _)| *n == name && linked.contains(name))
            .map(|(_, loc)| *loc)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let linked = &state.programs.get(&program)?.linked_source;
        UNIFORMS
            .iter()
            .find(|(n, _)| *n == name && linked.contains(name))
            .map(|(_, loc)| *loc)
    }

    fn uniform_1_i32(&self, location: Option<&u32>, x: i32) {
        self.with_current(location, |p, loc| {
            p.ints.insert(loc, x);
        });
        self.record(Call::Uniform1i(location.copied(), x));
    }

    fn uniform_2_f32(&self, location: Option<&u32>, x: f32, y: f32) {
        self.with_current(location, |p, loc| {
            p.vec2s.insert(loc, [x, y]);
        });
        self.record(Call::Uniform2f(location.copied(), [x, y]));
    }

    fn uniform_matrix_4(&self, location: Option<&u32>, value: &[f32; 16]) {
        self.with_current(location, |p, loc| {
            p.mat4s.insert(loc, *value);
        });
        self.record(Call::UniformMatrix4(location.copied(), *value));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.vertex_arrays.insert(id);
        state.calls.push(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.forget(|s| s.vertex_arrays.remove(&vertex_array), vertex_array);
        self.record(Call::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().vertex_array = vertex_array;
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.buffers.insert(id);
        state.calls.push(Call::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&self, buffer: u32) {
        self.forget(|s| s.buffers.remove(&buffer), buffer);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        self.state.borrow_mut().bound_buffers.insert(target, buffer);
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: u32, data: &[u8], _usage: u32) {
        self.record(Call::BufferData {
            target,
            len: data.len(),
            data: data.to_vec(),
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().attrib_arrays.insert(index);
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().attrib_arrays.remove(&index);
        self.record(Call::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, _offset: i32) {
        self.record(Call::DrawElements {
            mode,
            count,
            element_type,
        });
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_texture {
            return Err("out of texture memory".to_owned());
        }
        let id = state.next();
        state.textures.insert(id);
        state.calls.push(Call::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&self, texture: u32) {
        self.forget(|s| s.textures.remove(&texture), texture);
        self.record(Call::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, _target: u32, texture: Option<u32>) {
        self.state.borrow_mut().texture = texture;
        self.record(Call::BindTexture(texture));
    }

    fn tex_image_rgba8(&self, width: i32, height: i32, pixels: &[u8]) {
        self.record(Call::TexImage {
            width,
            height,
            len: pixels.len(),
        });
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(Call::TexParameter(parameter, value));
    }

    fn enable(&self, cap: u32) {
        self.state.borrow_mut().enabled.insert(cap);
        self.record(Call::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.state.borrow_mut().enabled.remove(&cap);
        self.record(Call::Disable(cap));
    }

    fn is_enabled(&self, cap: u32) -> bool {
        self.state.borrow().enabled.contains(&cap)
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Scissor(x, y, width, height));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear(&self, colour: [f32; 4]) {
        self.record(Call::Clear(colour));
    }
}
