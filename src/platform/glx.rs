use super::{add_space_separated, string_from_ptr, Drawable, NativeHandle};
use crate::capabilities::ContextCapabilities;
use crate::impl_prelude::*;
use crate::provider::{load_fn, require_fn};
use prelude_plus::*;

type Bool = c_int;
type Xid = c_ulong;

const FALSE: Bool = 0;

/// Minor versions of GLX 1.x which get a version token.
pub const GLX_MINOR_VERSIONS: [u32; 4] = [1, 2, 3, 4];

type GetCurrentDisplayFn = unsafe extern "C" fn() -> NativeHandle;
type GetCurrentContextFn = unsafe extern "C" fn() -> NativeHandle;
type QueryVersionFn =
  unsafe extern "C" fn(display: NativeHandle, major: *mut c_int, minor: *mut c_int) -> Bool;
type QueryExtensionsStringFn =
  unsafe extern "C" fn(display: NativeHandle, screen: c_int) -> *const c_char;
type MakeCurrentFn =
  unsafe extern "C" fn(display: NativeHandle, drawable: Xid, context: NativeHandle) -> Bool;
// glXMakeContextCurrent and glXMakeCurrentReadSGI share this signature
type MakeContextCurrentFn = unsafe extern "C" fn(
  display: NativeHandle,
  draw: Xid,
  read: Xid,
  context: NativeHandle,
) -> Bool;
type DestroyContextFn = unsafe extern "C" fn(display: NativeHandle, context: NativeHandle);

pub(crate) fn add_extensions(
  provider: &dyn FunctionProvider,
  extensions: &mut HashSet<String>,
) -> GlesResult<()> {
  let get_current_display: GetCurrentDisplayFn =
    unsafe { require_fn(provider, "glXGetCurrentDisplay")? };
  let query_version: QueryVersionFn = unsafe { require_fn(provider, "glXQueryVersion")? };

  let display = unsafe { get_current_display() };
  if display.is_null() {
    return Err(GlesError::fatal("There is no X display current in the current thread."));
  }

  let (mut major, mut minor) = (0, 0);
  if unsafe { query_version(display, &mut major, &mut minor) } == FALSE {
    return Err(GlesError::fatal("GLX is not available."));
  }
  if major != 1 {
    return Err(GlesError::fatal(format!("Invalid GLX major version: {}", major)));
  }

  for &glx_minor in &GLX_MINOR_VERSIONS {
    if (glx_minor as c_int) <= minor {
      extensions.insert(format!("GLX_{}{}", major, glx_minor));
    }
  }

  let query_extensions_string: Option<QueryExtensionsStringFn> =
    unsafe { load_fn(provider, "glXQueryExtensionsString") };
  if let Some(query_extensions_string) = query_extensions_string {
    if let Some(list) = unsafe { string_from_ptr(query_extensions_string(display, 0)) } {
      add_space_separated(extensions, &list);
    }
  }

  Ok(())
}

pub(crate) fn current_handles(
  provider: &dyn FunctionProvider,
  display: Option<NativeHandle>,
) -> GlesResult<(NativeHandle, NativeHandle)> {
  let display = match display {
    Some(display) => display,
    None => {
      let get_current_display: GetCurrentDisplayFn =
        unsafe { require_fn(provider, "glXGetCurrentDisplay")? };
      unsafe { get_current_display() }
    }
  };
  if display.is_null() {
    return Err(GlesError::fatal("Invalid X server connection specified."));
  }

  let get_current_context: GetCurrentContextFn =
    unsafe { require_fn(provider, "glXGetCurrentContext")? };
  let context = unsafe { get_current_context() };
  if context.is_null() {
    return Err(GlesError::fatal("No OpenGL ES context is current in the current thread."));
  }

  Ok((display, context))
}

pub struct GlxContext {
  display: NativeHandle,
  context: NativeHandle,

  make_current: MakeCurrentFn,
  make_context_current: Option<MakeContextCurrentFn>,
  get_current_context: GetCurrentContextFn,
  destroy_context: DestroyContextFn,
}

impl GlxContext {
  pub(crate) fn new(
    provider: &dyn FunctionProvider,
    display: NativeHandle,
    context: NativeHandle,
    capabilities: &ContextCapabilities,
  ) -> GlesResult<Self> {
    let make_context_current = if capabilities.extensions.glx_13 {
      unsafe { load_fn(provider, "glXMakeContextCurrent") }
    } else if capabilities.extensions.glx_sgi_make_current_read {
      unsafe { load_fn(provider, "glXMakeCurrentReadSGI") }
    } else {
      None
    };

    unsafe {
      Ok(Self {
        display,
        context,
        make_current: require_fn(provider, "glXMakeCurrent")?,
        make_context_current,
        get_current_context: require_fn(provider, "glXGetCurrentContext")?,
        destroy_context: require_fn(provider, "glXDestroyContext")?,
      })
    }
  }

  #[inline(always)]
  pub fn display(&self) -> NativeHandle { self.display }
  #[inline(always)]
  pub fn handle(&self) -> NativeHandle { self.context }

  pub fn supports_separate_read(&self) -> bool { self.make_context_current.is_some() }

  pub(crate) fn make_current(&self, target: Drawable) -> bool {
    unsafe { (self.make_current)(self.display, target as Xid, self.context) != FALSE }
  }

  pub(crate) fn make_current_read(&self, draw: Drawable, read: Drawable) -> GlesResult<bool> {
    let make_context_current = self.make_context_current.ok_or_else(|| {
      GlesError::unsupported(
        "separate draw and read drawables need GLX 1.3 or GLX_SGI_make_current_read",
      )
    })?;
    Ok(unsafe { make_context_current(self.display, draw as Xid, read as Xid, self.context) } != FALSE)
  }

  pub(crate) fn is_current(&self) -> bool {
    unsafe { (self.get_current_context)() == self.context }
  }

  pub(crate) fn destroy(&self) { unsafe { (self.destroy_context)(self.display, self.context) } }
}

impl fmt::Debug for GlxContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GlxContext")
      .field("display", &self.display)
      .field("context", &self.context)
      .field("separate_read", &self.supports_separate_read())
      .finish()
  }
}
