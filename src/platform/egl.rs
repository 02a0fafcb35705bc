use super::{add_space_separated, string_from_ptr, Drawable, NativeHandle};
use crate::impl_prelude::*;
use crate::provider::require_fn;
use crate::version::ApiVersion;
use prelude_plus::*;

pub type EGLBoolean = c_uint;
pub type EGLint = i32;
pub type EGLenum = c_uint;

pub const EGL_FALSE: EGLBoolean = 0;
pub const EGL_TRUE: EGLBoolean = 1;
pub const EGL_SUCCESS: EGLint = 0x3000;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_VERSION: EGLint = 0x3054;
pub const EGL_EXTENSIONS: EGLint = 0x3055;
pub const EGL_HEIGHT: EGLint = 0x3056;
pub const EGL_WIDTH: EGLint = 0x3057;
pub const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub const EGL_PBUFFER_BIT: EGLint = 0x0001;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;
pub const EGL_OPENGL_ES3_BIT: EGLint = 0x0040;
pub const EGL_OPENGL_ES_API: EGLenum = 0x30A0;
pub const EGL_CONTEXT_MAJOR_VERSION: EGLint = 0x3098;
pub const EGL_CONTEXT_MINOR_VERSION: EGLint = 0x30FB;
pub const EGL_CONTEXT_OPENGL_DEBUG: EGLint = 0x31B0;

/// Minor versions of EGL 1.x which get a version token.
pub const EGL_MINOR_VERSIONS: [u32; 6] = [0, 1, 2, 3, 4, 5];

type GetCurrentDisplayFn = unsafe extern "C" fn() -> NativeHandle;
type GetCurrentContextFn = unsafe extern "C" fn() -> NativeHandle;
type QueryStringFn = unsafe extern "C" fn(display: NativeHandle, name: EGLint) -> *const c_char;
type MakeCurrentFn = unsafe extern "C" fn(
  display: NativeHandle,
  draw: NativeHandle,
  read: NativeHandle,
  context: NativeHandle,
) -> EGLBoolean;
type DestroyContextFn =
  unsafe extern "C" fn(display: NativeHandle, context: NativeHandle) -> EGLBoolean;
type GetErrorFn = unsafe extern "C" fn() -> EGLint;
type GetDisplayFn = unsafe extern "C" fn(native_display: *mut c_void) -> NativeHandle;
type InitializeFn =
  unsafe extern "C" fn(display: NativeHandle, major: *mut EGLint, minor: *mut EGLint) -> EGLBoolean;
type BindApiFn = unsafe extern "C" fn(api: EGLenum) -> EGLBoolean;
type ChooseConfigFn = unsafe extern "C" fn(
  display: NativeHandle,
  attributes: *const EGLint,
  configs: *mut NativeHandle,
  config_size: EGLint,
  config_count: *mut EGLint,
) -> EGLBoolean;
type CreateContextFn = unsafe extern "C" fn(
  display: NativeHandle,
  config: NativeHandle,
  share_context: NativeHandle,
  attributes: *const EGLint,
) -> NativeHandle;
type CreatePbufferSurfaceFn = unsafe extern "C" fn(
  display: NativeHandle,
  config: NativeHandle,
  attributes: *const EGLint,
) -> NativeHandle;
type DestroySurfaceFn =
  unsafe extern "C" fn(display: NativeHandle, surface: NativeHandle) -> EGLBoolean;
type TerminateFn = unsafe extern "C" fn(display: NativeHandle) -> EGLBoolean;

fn current_display(provider: &dyn FunctionProvider) -> GlesResult<NativeHandle> {
  let get_current_display: GetCurrentDisplayFn =
    unsafe { require_fn(provider, "eglGetCurrentDisplay")? };
  Ok(unsafe { get_current_display() })
}

pub(crate) fn add_extensions(
  provider: &dyn FunctionProvider,
  extensions: &mut HashSet<String>,
) -> GlesResult<()> {
  let query_string: QueryStringFn = unsafe { require_fn(provider, "eglQueryString")? };

  let display = current_display(provider)?;
  if display.is_null() {
    return Err(GlesError::fatal("There is no EGL display current in the current thread."));
  }

  let version = unsafe { string_from_ptr(query_string(display, EGL_VERSION)) }
    .ok_or_else(|| GlesError::fatal("EGL is not available."))?;
  let version = ApiVersion::parse(&version)
    .ok_or_else(|| GlesError::fatal(format!("Invalid EGL version string: {:?}", version)))?;
  if version.major != 1 {
    return Err(GlesError::fatal(format!("Invalid EGL major version: {}", version.major)));
  }

  for &egl_minor in &EGL_MINOR_VERSIONS {
    if egl_minor <= version.minor {
      extensions.insert(format!("EGL_{}{}", version.major, egl_minor));
    }
  }

  if let Some(list) = unsafe { string_from_ptr(query_string(display, EGL_EXTENSIONS)) } {
    add_space_separated(extensions, &list);
  }

  Ok(())
}

pub(crate) fn current_handles(
  provider: &dyn FunctionProvider,
  display: Option<NativeHandle>,
) -> GlesResult<(NativeHandle, NativeHandle)> {
  let display = match display {
    Some(display) => display,
    None => current_display(provider)?,
  };
  if display.is_null() {
    return Err(GlesError::fatal("Invalid EGL display specified."));
  }

  let get_current_context: GetCurrentContextFn =
    unsafe { require_fn(provider, "eglGetCurrentContext")? };
  let context = unsafe { get_current_context() };
  if context.is_null() {
    return Err(GlesError::fatal("No OpenGL ES context is current in the current thread."));
  }

  Ok((display, context))
}

pub struct EglContext {
  display: NativeHandle,
  context: NativeHandle,

  make_current: MakeCurrentFn,
  get_current_context: GetCurrentContextFn,
  destroy_context: DestroyContextFn,
}

impl EglContext {
  pub(crate) fn new(
    provider: &dyn FunctionProvider,
    display: NativeHandle,
    context: NativeHandle,
  ) -> GlesResult<Self> {
    unsafe {
      Ok(Self {
        display,
        context,
        make_current: require_fn(provider, "eglMakeCurrent")?,
        get_current_context: require_fn(provider, "eglGetCurrentContext")?,
        destroy_context: require_fn(provider, "eglDestroyContext")?,
      })
    }
  }

  #[inline(always)]
  pub fn display(&self) -> NativeHandle { self.display }
  #[inline(always)]
  pub fn handle(&self) -> NativeHandle { self.context }

  pub(crate) fn make_current(&self, draw: Drawable, read: Drawable) -> bool {
    unsafe {
      (self.make_current)(self.display, draw as NativeHandle, read as NativeHandle, self.context)
        != EGL_FALSE
    }
  }

  pub(crate) fn is_current(&self) -> bool {
    unsafe { (self.get_current_context)() == self.context }
  }

  pub(crate) fn destroy(&self) -> GlesResult<()> {
    if unsafe { (self.destroy_context)(self.display, self.context) } == EGL_FALSE {
      return Err(GlesError::fatal("Failed to destroy the EGL context."));
    }
    Ok(())
  }
}

impl fmt::Debug for EglContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EglContext")
      .field("display", &self.display)
      .field("context", &self.context)
      .finish()
  }
}

/// An offscreen EGL context with the pbuffer it draws into, made current on the
/// calling thread by [`create_pbuffer_context`]. Adopt it with
/// [`Context::create_from_current`], and call [`PbufferSurface::destroy`]
/// once the adopted context has been destroyed.
pub struct PbufferSurface {
  display: NativeHandle,
  surface: NativeHandle,
  make_current: MakeCurrentFn,
  destroy_surface: DestroySurfaceFn,
  terminate: TerminateFn,
}

impl PbufferSurface {
  #[inline(always)]
  pub fn display(&self) -> NativeHandle { self.display }

  #[inline(always)]
  pub fn drawable(&self) -> Drawable { self.surface as Drawable }

  /// Unbinds everything from the calling thread, destroys the surface and
  /// terminates the display connection.
  pub fn destroy(self) -> GlesResult<()> {
    let null = ptr::null_mut();
    unsafe {
      (self.make_current)(self.display, null, null, null);
      if (self.destroy_surface)(self.display, self.surface) == EGL_FALSE {
        return Err(GlesError::fatal("Failed to destroy the EGL pbuffer surface."));
      }
      (self.terminate)(self.display);
    }
    Ok(())
  }
}

impl fmt::Debug for PbufferSurface {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PbufferSurface#<{:p}>", self.surface)
  }
}

/// Creates an OpenGL ES context of (at least) `version` on the default EGL
/// display together with a `size` pbuffer, and makes it current.
pub fn create_pbuffer_context(
  provider: &dyn FunctionProvider,
  size: (u32, u32),
  version: ApiVersion,
  debug: bool,
) -> GlesResult<PbufferSurface> {
  if provider.platform() != Platform::Egl {
    return Err(GlesError::fatal("Pbuffer contexts can only be created through EGL."));
  }

  unsafe {
    let get_error: GetErrorFn = require_fn(provider, "eglGetError")?;
    let get_display: GetDisplayFn = require_fn(provider, "eglGetDisplay")?;
    let initialize: InitializeFn = require_fn(provider, "eglInitialize")?;
    let bind_api: BindApiFn = require_fn(provider, "eglBindAPI")?;
    let choose_config: ChooseConfigFn = require_fn(provider, "eglChooseConfig")?;
    let create_context: CreateContextFn = require_fn(provider, "eglCreateContext")?;
    let create_pbuffer_surface: CreatePbufferSurfaceFn =
      require_fn(provider, "eglCreatePbufferSurface")?;
    let make_current: MakeCurrentFn = require_fn(provider, "eglMakeCurrent")?;
    let destroy_context: DestroyContextFn = require_fn(provider, "eglDestroyContext")?;
    let destroy_surface: DestroySurfaceFn = require_fn(provider, "eglDestroySurface")?;
    let terminate: TerminateFn = require_fn(provider, "eglTerminate")?;

    let egl_fail = |what: &str| {
      GlesError::fatal(format!("{} failed with EGL error 0x{:X}", what, get_error()))
    };

    let display = get_display(ptr::null_mut());
    if display.is_null() {
      return Err(GlesError::fatal("There is no default EGL display."));
    }

    let (mut egl_major, mut egl_minor) = (0, 0);
    if initialize(display, &mut egl_major, &mut egl_minor) == EGL_FALSE {
      return Err(egl_fail("eglInitialize"));
    }
    debug!("Initialized EGL {}.{}", egl_major, egl_minor);

    let result = (|| {
      if bind_api(EGL_OPENGL_ES_API) == EGL_FALSE {
        return Err(egl_fail("eglBindAPI"));
      }

      let renderable_type = if version.major >= 3 { EGL_OPENGL_ES3_BIT } else { EGL_OPENGL_ES2_BIT };
      let config_attributes =
        [EGL_SURFACE_TYPE, EGL_PBUFFER_BIT, EGL_RENDERABLE_TYPE, renderable_type, EGL_NONE];
      let mut config = ptr::null_mut();
      let mut config_count = 0;
      let chosen =
        choose_config(display, config_attributes.as_ptr(), &mut config, 1, &mut config_count);
      if chosen == EGL_FALSE {
        return Err(egl_fail("eglChooseConfig"));
      }
      if config_count < 1 {
        return Err(GlesError::fatal(format!("No EGL config supports OpenGL ES {}", version)));
      }

      let mut context_attributes = vec![
        EGL_CONTEXT_MAJOR_VERSION,
        version.major as EGLint,
        EGL_CONTEXT_MINOR_VERSION,
        version.minor as EGLint,
      ];
      // debug contexts are only part of the core API since 1.5
      if debug && (egl_major, egl_minor) >= (1, 5) {
        context_attributes.extend_from_slice(&[EGL_CONTEXT_OPENGL_DEBUG, EGL_TRUE as EGLint]);
      }
      context_attributes.push(EGL_NONE);

      let context =
        create_context(display, config, ptr::null_mut(), context_attributes.as_ptr());
      if context.is_null() {
        return Err(egl_fail("eglCreateContext"));
      }

      let width = i32::try_from(size.0).unwrap_or(i32::MAX);
      let height = i32::try_from(size.1).unwrap_or(i32::MAX);
      let surface_attributes = [EGL_WIDTH, width, EGL_HEIGHT, height, EGL_NONE];
      let surface = create_pbuffer_surface(display, config, surface_attributes.as_ptr());
      if surface.is_null() {
        let err = egl_fail("eglCreatePbufferSurface");
        destroy_context(display, context);
        return Err(err);
      }

      if make_current(display, surface, surface, context) == EGL_FALSE {
        let err = egl_fail("eglMakeCurrent");
        destroy_surface(display, surface);
        destroy_context(display, context);
        return Err(err);
      }

      Ok(surface)
    })();

    match result {
      Ok(surface) => Ok(PbufferSurface { display, surface, make_current, destroy_surface, terminate }),
      Err(err) => {
        terminate(display);
        Err(err)
      }
    }
  }
}
