//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing shaders on a
//! graphics device. This module also provides the [`Uniform`] trait for setting uniform variables
//! in shader programs.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::debug;

use crate::abs::device::ShaderDevice;
use crate::abs::error::ShaderError;
use crate::abs::source::{ShaderSource, StageKind};

/// Represents an individual compiled shader stage.
pub struct Shader<G: ShaderDevice> {
    gl: Arc<G>,
    id: G::Shader,
    stage: StageKind,
}

impl<G: ShaderDevice> Shader<G> {
    /// Compiles a new shader stage from the given source code.
    pub fn new(gl: &Arc<G>, stage: StageKind, source: &str) -> Result<Self, ShaderError> {
        let shader = gl
            .create_shader(stage)
            .map_err(|detail| ShaderError::CreateResource {
                what: "shader",
                detail,
            })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = gl.shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(Self {
            gl: Arc::clone(gl),
            id: shader,
            stage,
        })
    }

    /// Returns which stage this shader was compiled as.
    pub fn stage(&self) -> StageKind {
        self.stage
    }
}

impl<G: ShaderDevice> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// Represents a uniform variable value in a shader program.
pub trait Uniform<G: ShaderDevice> {
    /// Sets the value of the uniform variable in the given shader program.
    ///
    /// A name with no matching uniform in the program is a silent no-op.
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str);
}

impl<G: ShaderDevice> Uniform<G> for bool {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_i32(&loc, *self as i32);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for i32 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_i32(&loc, *self);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for f32 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_f32(&loc, *self);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for Vec2 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_vec2(&loc, self.x, self.y);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for Vec3 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_vec3(&loc, self.x, self.y, self.z);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for Vec4 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_vec4(&loc, self.x, self.y, self.z, self.w);
        }
    }
}

impl<G: ShaderDevice> Uniform<G> for Mat4 {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        if let Some(loc) = gl.uniform_location(program, name) {
            gl.set_uniform_mat4(&loc, &self.to_cols_array());
        }
    }
}

impl<G: ShaderDevice, T: Uniform<G>> Uniform<G> for &T {
    fn set_uniform(&self, gl: &G, program: G::Program, name: &str) {
        (*self).set_uniform(gl, program, name);
    }
}

/// Represents a linked shader program composed of compiled stages.
pub struct ShaderProgram<G: ShaderDevice> {
    gl: Arc<G>,
    id: G::Program,
}

impl<G: ShaderDevice> ShaderProgram<G> {
    /// Links a new shader program from the given stages.
    ///
    /// The stages are detached again once the program has linked; each stage
    /// object is freed when its [`Shader`] handle is dropped.
    pub fn new(gl: &Arc<G>, shaders: &[&Shader<G>]) -> Result<Self, ShaderError> {
        let program = gl
            .create_program()
            .map_err(|detail| ShaderError::CreateResource {
                what: "program",
                detail,
            })?;

        for shader in shaders {
            gl.attach_shader(program, shader.id);
        }

        gl.link_program(program);

        if !gl.program_link_status(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            return Err(ShaderError::Link { log });
        }

        for shader in shaders {
            gl.detach_shader(program, shader.id);
        }

        Ok(Self {
            gl: Arc::clone(gl),
            id: program,
        })
    }

    /// Compiles and links both stages of a combined source.
    ///
    /// Both stages must be present in the source. The vertex stage is
    /// compiled first and a failure there aborts the build before the
    /// fragment stage is touched. The intermediate stage objects are dropped
    /// once the program has linked.
    pub fn from_source(gl: &Arc<G>, source: &ShaderSource) -> Result<Self, ShaderError> {
        let vertex_src = source
            .stage(StageKind::Vertex)
            .ok_or(ShaderError::MissingStage {
                stage: StageKind::Vertex,
            })?;
        let fragment_src = source
            .stage(StageKind::Fragment)
            .ok_or(ShaderError::MissingStage {
                stage: StageKind::Fragment,
            })?;

        let vertex = Shader::new(gl, StageKind::Vertex, vertex_src)?;
        let fragment = Shader::new(gl, StageKind::Fragment, fragment_src)?;
        let program = Self::new(gl, &[&vertex, &fragment])?;
        debug!("linked shader program from '{}'", source.origin());
        Ok(program)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.id));
    }

    /// Unbinds any active program.
    pub fn detach(&self) {
        self.gl.use_program(None);
    }

    /// Sets a uniform variable in the shader program.
    pub fn set_uniform<T: Uniform<G>>(&self, name: &str, value: T) {
        value.set_uniform(&self.gl, self.id, name);
    }
}

impl<G: ShaderDevice> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateShader(u32, StageKind),
        ShaderSource(u32, String),
        CompileShader(u32),
        DeleteShader(u32),
        CreateProgram(u32),
        AttachShader(u32, u32),
        DetachShader(u32, u32),
        LinkProgram(u32),
        DeleteProgram(u32),
        UseProgram(Option<u32>),
        UniformLocation(String),
        SetI32(u32, i32),
        SetF32(u32, f32),
        SetVec2(u32, [f32; 2]),
        SetVec3(u32, [f32; 3]),
        SetVec4(u32, [f32; 4]),
        SetMat4(u32, [f32; 16]),
    }

    /// Fake device that journals every call it receives.
    #[derive(Default)]
    struct RecordingDevice {
        calls: RefCell<Vec<Call>>,
        next_id: RefCell<u32>,
        shader_stages: RefCell<HashMap<u32, StageKind>>,
        fail_stage: Option<StageKind>,
        fail_link: bool,
        uniforms: Vec<String>,
    }

    impl RecordingDevice {
        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }

        fn fresh_id(&self) -> u32 {
            let mut id = self.next_id.borrow_mut();
            *id += 1;
            *id
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.borrow().iter().filter(|&call| pred(call)).count()
        }
    }

    impl ShaderDevice for RecordingDevice {
        type Shader = u32;
        type Program = u32;
        type UniformLocation = u32;

        fn create_shader(&self, stage: StageKind) -> Result<u32, String> {
            let id = self.fresh_id();
            self.shader_stages.borrow_mut().insert(id, stage);
            self.record(Call::CreateShader(id, stage));
            Ok(id)
        }

        fn shader_source(&self, shader: u32, source: &str) {
            self.record(Call::ShaderSource(shader, source.to_string()));
        }

        fn compile_shader(&self, shader: u32) {
            self.record(Call::CompileShader(shader));
        }

        fn shader_compile_status(&self, shader: u32) -> bool {
            let stage = self.shader_stages.borrow()[&shader];
            self.fail_stage != Some(stage)
        }

        fn shader_info_log(&self, _shader: u32) -> String {
            "stage rejected".to_string()
        }

        fn delete_shader(&self, shader: u32) {
            self.record(Call::DeleteShader(shader));
        }

        fn create_program(&self) -> Result<u32, String> {
            let id = self.fresh_id();
            self.record(Call::CreateProgram(id));
            Ok(id)
        }

        fn attach_shader(&self, program: u32, shader: u32) {
            self.record(Call::AttachShader(program, shader));
        }

        fn detach_shader(&self, program: u32, shader: u32) {
            self.record(Call::DetachShader(program, shader));
        }

        fn link_program(&self, program: u32) {
            self.record(Call::LinkProgram(program));
        }

        fn program_link_status(&self, _program: u32) -> bool {
            !self.fail_link
        }

        fn program_info_log(&self, _program: u32) -> String {
            "link rejected".to_string()
        }

        fn delete_program(&self, program: u32) {
            self.record(Call::DeleteProgram(program));
        }

        fn use_program(&self, program: Option<u32>) {
            self.record(Call::UseProgram(program));
        }

        fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
            self.record(Call::UniformLocation(name.to_string()));
            self.uniforms.iter().position(|u| u == name).map(|i| i as u32)
        }

        fn set_uniform_i32(&self, location: &u32, value: i32) {
            self.record(Call::SetI32(*location, value));
        }

        fn set_uniform_f32(&self, location: &u32, value: f32) {
            self.record(Call::SetF32(*location, value));
        }

        fn set_uniform_vec2(&self, location: &u32, x: f32, y: f32) {
            self.record(Call::SetVec2(*location, [x, y]));
        }

        fn set_uniform_vec3(&self, location: &u32, x: f32, y: f32, z: f32) {
            self.record(Call::SetVec3(*location, [x, y, z]));
        }

        fn set_uniform_vec4(&self, location: &u32, x: f32, y: f32, z: f32, w: f32) {
            self.record(Call::SetVec4(*location, [x, y, z, w]));
        }

        fn set_uniform_mat4(&self, location: &u32, values: &[f32; 16]) {
            self.record(Call::SetMat4(*location, *values));
        }
    }

    const VALID: &str = "#type vertex\nvoid main() {}\n#type fragment\nvoid main() {}\n";

    fn device(
        fail_stage: Option<StageKind>,
        fail_link: bool,
        uniforms: &[&str],
    ) -> Arc<RecordingDevice> {
        Arc::new(RecordingDevice {
            fail_stage,
            fail_link,
            uniforms: uniforms.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        })
    }

    fn valid_source() -> ShaderSource {
        ShaderSource::parse("valid.glsl", VALID).unwrap()
    }

    #[test]
    fn test_from_source_compiles_vertex_before_fragment() {
        let gl = device(None, false, &[]);
        let _program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        let calls = gl.calls();
        let vertex_at = calls
            .iter()
            .position(|call| matches!(call, Call::CreateShader(_, StageKind::Vertex)))
            .unwrap();
        let fragment_at = calls
            .iter()
            .position(|call| matches!(call, Call::CreateShader(_, StageKind::Fragment)))
            .unwrap();
        let link_at = calls
            .iter()
            .position(|call| matches!(call, Call::LinkProgram(_)))
            .unwrap();
        assert!(vertex_at < fragment_at);
        assert!(fragment_at < link_at);
    }

    #[test]
    fn test_stage_objects_freed_after_link() {
        let gl = device(None, false, &[]);
        let program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        assert_eq!(gl.count(|call| matches!(call, Call::DetachShader(..))), 2);
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteShader(_))), 2);
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteProgram(_))), 0);

        drop(program);
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteProgram(_))), 1);
    }

    #[test]
    fn test_vertex_failure_aborts_before_fragment() {
        let gl = device(Some(StageKind::Vertex), false, &[]);
        let Err(err) = ShaderProgram::from_source(&gl, &valid_source()) else {
            panic!("expected vertex compile failure");
        };
        let ShaderError::Compile { stage, log } = err else {
            panic!("expected Compile error");
        };
        assert_eq!(stage, StageKind::Vertex);
        assert_eq!(log, "stage rejected");

        assert_eq!(
            gl.count(|call| matches!(call, Call::CreateShader(_, StageKind::Fragment))),
            0
        );
        assert_eq!(gl.count(|call| matches!(call, Call::CreateProgram(_))), 0);
        // the rejected stage object is freed immediately
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteShader(_))), 1);
    }

    #[test]
    fn test_fragment_failure_reports_stage() {
        let gl = device(Some(StageKind::Fragment), false, &[]);
        let Err(ShaderError::Compile { stage, .. }) =
            ShaderProgram::from_source(&gl, &valid_source())
        else {
            panic!("expected fragment compile failure");
        };
        assert_eq!(stage, StageKind::Fragment);
        assert_eq!(gl.count(|call| matches!(call, Call::CreateProgram(_))), 0);
        // rejected fragment object plus the already-compiled vertex object
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteShader(_))), 2);
    }

    #[test]
    fn test_link_failure_reports_log() {
        let gl = device(None, true, &[]);
        let Err(ShaderError::Link { log }) = ShaderProgram::from_source(&gl, &valid_source())
        else {
            panic!("expected link failure");
        };
        assert_eq!(log, "link rejected");
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteProgram(_))), 1);
        assert_eq!(gl.count(|call| matches!(call, Call::DeleteShader(_))), 2);
    }

    #[test]
    fn test_missing_stage_guard() {
        let gl = device(None, false, &[]);
        let source =
            ShaderSource::parse("dup.glsl", "#type vertex\nA\n#type vertex\nB\n").unwrap();
        let Err(ShaderError::MissingStage { stage }) = ShaderProgram::from_source(&gl, &source)
        else {
            panic!("expected MissingStage");
        };
        assert_eq!(stage, StageKind::Fragment);
        // the guard fires before any device work
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn test_use_program_and_detach() {
        let gl = device(None, false, &[]);
        let program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        program.use_program();
        assert!(matches!(gl.calls().last(), Some(Call::UseProgram(Some(_)))));

        program.detach();
        assert!(matches!(gl.calls().last(), Some(Call::UseProgram(None))));
    }

    #[test]
    fn test_identity_matrix_upload() {
        let gl = device(None, false, &["mvp"]);
        let program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        program.use_program();
        program.set_uniform("mvp", Mat4::IDENTITY);

        let uploads: Vec<Call> = gl
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::SetMat4(..)))
            .collect();
        assert_eq!(uploads.len(), 1);
        let Call::SetMat4(_, values) = &uploads[0] else {
            unreachable!();
        };
        assert_eq!(values, &Mat4::IDENTITY.to_cols_array());
    }

    #[test]
    fn test_unknown_uniform_is_noop() {
        let gl = device(None, false, &["mvp"]);
        let program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        program.set_uniform("missing", 1.0f32);
        assert_eq!(gl.count(|call| matches!(call, Call::SetF32(..))), 0);
        // the lookup itself still happens
        assert_eq!(gl.count(|call| matches!(call, Call::UniformLocation(_))), 1);
    }

    #[test]
    fn test_uniform_value_forms() {
        let gl = device(None, false, &["u_flag", "u_count", "u_size", "u_dir", "u_tint"]);
        let program = ShaderProgram::from_source(&gl, &valid_source()).unwrap();

        program.set_uniform("u_flag", true);
        program.set_uniform("u_count", 7i32);
        program.set_uniform("u_size", Vec2::new(1.0, 2.0));
        program.set_uniform("u_dir", &Vec3::new(0.0, 1.0, 0.0));
        program.set_uniform("u_tint", Vec4::new(1.0, 0.5, 0.25, 1.0));

        let calls = gl.calls();
        assert!(calls.contains(&Call::SetI32(0, 1)));
        assert!(calls.contains(&Call::SetI32(1, 7)));
        assert!(calls.contains(&Call::SetVec2(2, [1.0, 2.0])));
        assert!(calls.contains(&Call::SetVec3(3, [0.0, 1.0, 0.0])));
        assert!(calls.contains(&Call::SetVec4(4, [1.0, 0.5, 0.25, 1.0])));
    }

    #[test]
    fn test_standalone_shader_reports_its_stage() {
        let gl = device(None, false, &[]);
        let shader = Shader::new(&gl, StageKind::Fragment, "void main() {}").unwrap();
        assert_eq!(shader.stage(), StageKind::Fragment);
    }
}
