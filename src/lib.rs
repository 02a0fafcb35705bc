//! Runtime loader for OpenGL ES drivers: opens the driver library, resolves
//! entry points, negotiates the capabilities of the current context, keeps
//! track of which context is current on which thread and hooks the driver's
//! debug output up to a log stream.

macro_rules! gl_enum {
  // a wrapper for autoformatting purposes
  ({$($tt:tt)+}) => { gl_enum! { $($tt)+ } };

  (
    $(#[$enum_meta:meta])* $visibility:vis enum $enum_name:ident {
      $($(#[$variant_meta:meta])* $rust_variant:ident = $gl_variant:path => $label:literal),+ $(,)?
    }
  ) => {
    #[repr(u32)]
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    $(#[$enum_meta])*
    $visibility enum $enum_name {
      $($(#[$variant_meta])* $rust_variant = $gl_variant,)+
    }

    #[allow(dead_code)]
    impl $enum_name {
      $visibility const VARIANTS: &'static [Self] = &[$(Self::$rust_variant),+];

      $visibility const fn from_raw(raw: ::gl::types::GLenum) -> Option<Self> {
        Some(match raw {
          $($gl_variant => Self::$rust_variant,)+
          _ => return None,
        })
      }

      #[inline(always)]
      $visibility const fn as_raw(&self) -> ::gl::types::GLenum {
        *self as ::gl::types::GLenum
      }

      $visibility const fn label(&self) -> &'static str {
        match self {
          $(Self::$rust_variant => $label,)+
        }
      }
    }
  };
}

pub mod capabilities;
pub mod config;
pub mod context;
pub mod debug;
pub mod error;
pub mod gles;
mod impl_prelude;
pub mod platform;
pub mod provider;
pub mod version;

#[cfg(test)]
mod test_driver;

pub use capabilities::*;
pub use config::GlesConfig;
pub use context::{Context, SharedContext};
pub use debug::{DebugMechanism, DebugMessageCallback, DebugOutput};
pub use error::{translate_error, GlesError, GlesResult};
pub use platform::Platform;
pub use provider::{FunctionProvider, NativeFunctionProvider};
pub use version::ApiVersion;
