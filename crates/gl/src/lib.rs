//! Generated OpenGL ES 3.2 bindings (plus `GL_KHR_debug`).

pub use self::all::*;

pub mod all {
  #![allow(clippy::all)]
  include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

// Desktop-only tokens which the ES registry doesn't carry, but which drivers
// exposing desktop extensions to ES contexts still answer to.
pub mod desktop {
  use super::types::GLenum;

  pub const CONTEXT_FLAG_FORWARD_COMPATIBLE_BIT: GLenum = 0x0001;
  pub const CONTEXT_PROFILE_MASK: GLenum = 0x9126;
  pub const CONTEXT_CORE_PROFILE_BIT: GLenum = 0x0001;
  pub const TABLE_TOO_LARGE: GLenum = 0x8031;
}

pub mod prelude {
  pub use super::all as gl;
  pub use super::all::types::*;
  pub use super::all::Gles2;
}
