//! The seam between the shader abstractions and the graphics device.
//!
//! [`ShaderDevice`] captures the handful of device entry points the shader
//! module needs: stage and program object lifecycle, compile/link status and
//! info logs, program binding, and uniform upload. The production device is
//! [`glow::Context`], supplied by the embedding engine; the shader types are
//! generic over the trait so another backend (or a test double) can stand in.

use glow::HasContext;

use crate::abs::source::StageKind;

/// Device operations required to build and use a shader program.
pub trait ShaderDevice {
    type Shader: Copy;
    type Program: Copy;
    type UniformLocation: Clone;

    fn create_shader(&self, stage: StageKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Binds the given program, or the null program for `None`.
    fn use_program(&self, program: Option<Self::Program>);

    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn set_uniform_i32(&self, location: &Self::UniformLocation, value: i32);
    fn set_uniform_f32(&self, location: &Self::UniformLocation, value: f32);
    fn set_uniform_vec2(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn set_uniform_vec3(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn set_uniform_vec4(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    /// Uploads a 4x4 matrix in column-major order.
    fn set_uniform_mat4(&self, location: &Self::UniformLocation, values: &[f32; 16]);
}

impl ShaderDevice for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: StageKind) -> Result<Self::Shader, String> {
        let kind = match stage {
            StageKind::Vertex => glow::VERTEX_SHADER,
            StageKind::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, kind) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    fn set_uniform_i32(&self, location: &Self::UniformLocation, value: i32) {
        unsafe { HasContext::uniform_1_i32(self, Some(location), value) }
    }

    fn set_uniform_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { HasContext::uniform_1_f32(self, Some(location), value) }
    }

    fn set_uniform_vec2(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { HasContext::uniform_2_f32(self, Some(location), x, y) }
    }

    fn set_uniform_vec3(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { HasContext::uniform_3_f32(self, Some(location), x, y, z) }
    }

    fn set_uniform_vec4(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe { HasContext::uniform_4_f32(self, Some(location), x, y, z, w) }
    }

    fn set_uniform_mat4(&self, location: &Self::UniformLocation, values: &[f32; 16]) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, Some(location), false, values) }
    }
}
