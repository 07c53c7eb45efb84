//! Engine fragments for a 2D/3D game: mouse input tracking and shader
//! program loading over an OpenGL context.
//!
//! The embedding engine owns the window, the GL context
//! (`Arc<glow::Context>`), and the event loop. This crate supplies the
//! pieces in between: [`input::MouseState`] consumes the SDL events the loop
//! polls, and [`abs::ShaderProgram`] turns a combined `#type
//! vertex`/`#type fragment` source file into a linked, uniform-ready
//! program.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ember2d::abs::{ShaderProgram, ShaderSource};
//! use ember2d::input::MouseState;
//!
//! # fn run(gl: Arc<glow::Context>, event_pump: &mut sdl2::EventPump) -> Result<(), Box<dyn std::error::Error>> {
//! let source = ShaderSource::load("assets/shaders/default.glsl")?;
//! let program = ShaderProgram::from_source(&gl, &source)?;
//!
//! let mut mouse = MouseState::new();
//! loop {
//!     for event in event_pump.poll_iter() {
//!         mouse.handle_event(&event);
//!     }
//!
//!     program.use_program();
//!     program.set_uniform("u_mvp", glam::Mat4::IDENTITY);
//!     // ... draw ...
//!
//!     mouse.end_frame();
//! }
//! # }
//! ```

pub mod abs;
pub mod input;
pub mod logging;
