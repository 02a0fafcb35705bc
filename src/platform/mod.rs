//! The windowing systems an OpenGL ES context can live in. The platform is
//! picked once per function provider, everything platform-specific after that
//! branches on the [`Platform`] or [`PlatformContext`] tag.

use crate::capabilities::ContextCapabilities;
use crate::config::GlesConfig;
use crate::impl_prelude::*;
use prelude_plus::*;

pub mod egl;
pub mod glx;

/// An opaque driver-owned handle: an X `Display*`, a `GLXContext`, an
/// `EGLDisplay` or an `EGLContext`.
pub type NativeHandle = *mut c_void;

/// A surface to render into: a GLX drawable XID or the address of an
/// `EGLSurface`.
pub type Drawable = usize;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Platform {
  Glx,
  Egl,
}

impl Platform {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.trim().to_ascii_lowercase().as_str() {
      "glx" => Some(Self::Glx),
      "egl" => Some(Self::Egl),
      _ => None,
    }
  }

  /// Picks the platform for the running OS, honoring the override in the
  /// configuration.
  pub fn detect(config: &GlesConfig) -> GlesResult<Self> {
    if let Some(name) = &config.platform {
      match Self::from_name(name) {
        Some(platform) => return Ok(platform),
        None => warn!("Unknown OpenGL ES platform {:?}, falling back to the default", name),
      }
    }

    if cfg!(any(
      target_os = "linux",
      target_os = "android",
      target_os = "freebsd",
      target_os = "dragonfly",
      target_os = "netbsd",
      target_os = "openbsd",
    )) {
      Ok(Self::Egl)
    } else {
      Err(GlesError::fatal("OpenGL ES is not supported on this platform."))
    }
  }

  pub fn default_library_name(self) -> &'static str {
    match self {
      Self::Glx => "libGL.so.1",
      Self::Egl if cfg!(target_os = "android") => "libGLESv2.so",
      Self::Egl => "libGLESv2.so.2",
    }
  }

  /// The library holding the windowing system entry points, if those don't
  /// live in the driver library itself.
  pub fn platform_library_name(self) -> Option<&'static str> {
    match self {
      Self::Glx => None,
      Self::Egl if cfg!(target_os = "android") => Some("libEGL.so"),
      Self::Egl => Some("libEGL.so.1"),
    }
  }

  /// Extension lookup functions of the windowing system, in order of
  /// preference.
  pub fn get_proc_address_names(self) -> &'static [&'static str] {
    match self {
      Self::Glx => &["glXGetProcAddress", "glXGetProcAddressARB"],
      Self::Egl => &["eglGetProcAddress"],
    }
  }

  /// Adds the windowing system version tokens and extensions of the current
  /// display to `extensions`.
  pub fn add_extensions(
    self,
    provider: &dyn FunctionProvider,
    extensions: &mut HashSet<String>,
  ) -> GlesResult<()> {
    match self {
      Self::Glx => glx::add_extensions(provider, extensions),
      Self::Egl => egl::add_extensions(provider, extensions),
    }
  }

  /// Returns the display and context handles currently bound on this thread.
  /// `display` overrides the display query.
  pub fn current_handles(
    self,
    provider: &dyn FunctionProvider,
    display: Option<NativeHandle>,
  ) -> GlesResult<(NativeHandle, NativeHandle)> {
    match self {
      Self::Glx => glx::current_handles(provider, display),
      Self::Egl => egl::current_handles(provider, display),
    }
  }
}

pub(crate) fn add_space_separated(extensions: &mut HashSet<String>, list: &str) {
  extensions.extend(list.split_ascii_whitespace().map(str::to_owned));
}

pub(crate) unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
  if ptr.is_null() {
    None
  } else {
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
  }
}

/// The platform-specific half of a [`Context`].
#[derive(Debug)]
pub enum PlatformContext {
  Glx(glx::GlxContext),
  Egl(egl::EglContext),
}

impl PlatformContext {
  pub(crate) fn new(
    provider: &dyn FunctionProvider,
    display: NativeHandle,
    context: NativeHandle,
    capabilities: &ContextCapabilities,
  ) -> GlesResult<Self> {
    Ok(match provider.platform() {
      Platform::Glx => Self::Glx(glx::GlxContext::new(provider, display, context, capabilities)?),
      Platform::Egl => Self::Egl(egl::EglContext::new(provider, display, context)?),
    })
  }

  pub fn platform(&self) -> Platform {
    match self {
      Self::Glx(_) => Platform::Glx,
      Self::Egl(_) => Platform::Egl,
    }
  }

  pub fn display(&self) -> NativeHandle {
    match self {
      Self::Glx(ctx) => ctx.display(),
      Self::Egl(ctx) => ctx.display(),
    }
  }

  pub fn handle(&self) -> NativeHandle {
    match self {
      Self::Glx(ctx) => ctx.handle(),
      Self::Egl(ctx) => ctx.handle(),
    }
  }

  pub(crate) fn supports_separate_read(&self) -> bool {
    match self {
      Self::Glx(ctx) => ctx.supports_separate_read(),
      Self::Egl(_) => true,
    }
  }

  pub(crate) fn make_current(&self, target: Drawable) -> GlesResult<()> {
    check_make_current(match self {
      Self::Glx(ctx) => ctx.make_current(target),
      Self::Egl(ctx) => ctx.make_current(target, target),
    })
  }

  pub(crate) fn make_current_read(&self, draw: Drawable, read: Drawable) -> GlesResult<()> {
    check_make_current(match self {
      Self::Glx(ctx) => ctx.make_current_read(draw, read)?,
      Self::Egl(ctx) => ctx.make_current(draw, read),
    })
  }

  pub(crate) fn is_current(&self) -> bool {
    match self {
      Self::Glx(ctx) => ctx.is_current(),
      Self::Egl(ctx) => ctx.is_current(),
    }
  }

  pub(crate) fn destroy(&self) -> GlesResult<()> {
    match self {
      Self::Glx(ctx) => {
        ctx.destroy();
        Ok(())
      }
      Self::Egl(ctx) => ctx.destroy(),
    }
  }
}

fn check_make_current(success: bool) -> GlesResult<()> {
  if success {
    Ok(())
  } else {
    Err(GlesError::fatal("Failed to make the OpenGL ES context current."))
  }
}
