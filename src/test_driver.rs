//! A driver living entirely in thread-local memory, so that the negotiation,
//! context and debug output code can be exercised without a GPU. Every test
//! thread gets its own driver.

use crate::debug::DebugProc;
use crate::impl_prelude::*;
use crate::platform::egl::{EGLBoolean, EGLint, EGL_EXTENSIONS, EGL_FALSE, EGL_TRUE, EGL_VERSION};
use crate::platform::NativeHandle;
use prelude_plus::*;

pub const DISPLAY: usize = 0xD15;
pub const CONTEXT: usize = 0xC0;

#[derive(Debug, Clone)]
pub struct FakeDriver {
  pub version_string: Option<String>,
  /// `None` makes the `GL_MAJOR_VERSION` query raise `GL_INVALID_ENUM`, like
  /// ES 2.0 drivers do.
  pub major: Option<GLint>,
  pub minor: GLint,
  pub extensions_string: Option<String>,
  pub indexed_extensions: Vec<String>,
  /// Indices past the real list for which `glGetStringi` returns null.
  pub broken_indexed_extensions: GLint,
  pub context_flags: GLint,
  pub profile_mask: GLint,
  pub pending_errors: VecDeque<GLenum>,
  /// Entry points the provider pretends not to know.
  pub missing: Vec<&'static str>,

  pub current_display: usize,
  pub current_context: usize,
  pub make_current_succeeds: bool,
  pub egl_version: Option<String>,
  pub egl_extensions: Option<String>,
  pub glx_version: Option<(c_int, c_int)>,
  pub glx_extensions: Option<String>,

  /// `(draw, read, context)` of every successful make-current call.
  pub made_current: Vec<(usize, usize, usize)>,
  pub destroyed: Vec<usize>,
  pub enabled: Vec<GLenum>,
  /// Names of the callback setters called, in order.
  pub callback_setters: Vec<&'static str>,
  pub debug_callback: Option<(DebugProc, usize)>,
}

impl FakeDriver {
  pub fn es2() -> Self {
    Self {
      version_string: Some("OpenGL ES 2.0 Fake".to_owned()),
      major: None,
      minor: 0,
      extensions_string: Some("GL_OES_fake GL_OES_texture_npot".to_owned()),
      indexed_extensions: Vec::new(),
      broken_indexed_extensions: 0,
      context_flags: 0,
      profile_mask: 0,
      pending_errors: VecDeque::new(),
      missing: Vec::new(),

      current_display: DISPLAY,
      current_context: CONTEXT,
      make_current_succeeds: true,
      egl_version: Some("1.5 Fake".to_owned()),
      egl_extensions: Some("EGL_KHR_fake".to_owned()),
      glx_version: Some((1, 4)),
      glx_extensions: Some("GLX_ARB_fake".to_owned()),

      made_current: Vec::new(),
      destroyed: Vec::new(),
      enabled: Vec::new(),
      callback_setters: Vec::new(),
      debug_callback: None,
    }
  }

  pub fn es3(major: GLint, minor: GLint) -> Self {
    Self {
      version_string: Some(format!("OpenGL ES {}.{} Fake", major, minor)),
      major: Some(major),
      minor,
      extensions_string: Some("GL_OES_legacy_listing".to_owned()),
      indexed_extensions: vec!["GL_EXT_color_buffer_float".to_owned()],
      ..Self::es2()
    }
  }

  pub fn with_extensions(mut self, names: &[&str]) -> Self {
    self.indexed_extensions.extend(names.iter().map(|&name| name.to_owned()));
    self
  }
}

thread_local! {
  static DRIVER: RefCell<FakeDriver> = RefCell::new(FakeDriver::es2());
}

pub fn install(driver: FakeDriver) { DRIVER.with(|slot| *slot.borrow_mut() = driver); }

pub fn with<T>(f: impl FnOnce(&mut FakeDriver) -> T) -> T {
  DRIVER.with(|slot| f(&mut slot.borrow_mut()))
}

/// Sends a message through the installed debug callback the way a driver
/// would. Returns `false` if nothing is installed.
pub fn emit_debug_message(
  source: GLenum,
  type_: GLenum,
  id: GLuint,
  severity: GLenum,
  message: &str,
) -> bool {
  // the callback must run without the driver borrowed
  let callback = with(|driver| driver.debug_callback);
  match callback {
    Some((callback, user_param)) => {
      callback(
        source,
        type_,
        id,
        severity,
        message.len() as GLsizei,
        message.as_ptr() as *const GLchar,
        user_param as *mut c_void,
      );
      true
    }
    None => false,
  }
}

// The strings handed out to the code under test must stay valid for as long as
// it holds the pointer, leaking them is the simplest way to get there.
fn leak_string<T>(string: Option<String>) -> *const T {
  match string {
    Some(string) => CString::new(string).map_or(ptr::null(), |s| s.into_raw() as *const T),
    None => ptr::null(),
  }
}

#[derive(Debug)]
pub struct FakeProvider {
  platform: Platform,
}

impl FakeProvider {
  pub fn new(platform: Platform) -> Self { Self { platform } }
}

impl FunctionProvider for FakeProvider {
  fn platform(&self) -> Platform { self.platform }

  fn function_address(&self, name: &str) -> Option<NonNull<c_void>> {
    if with(|driver| driver.missing.iter().any(|&missing| missing == name)) {
      return None;
    }

    let address = match name {
      "glGetError" => gl_get_error as usize,
      "glGetString" => gl_get_string as usize,
      "glGetIntegerv" => gl_get_integerv as usize,
      "glGetStringi" => gl_get_stringi as usize,
      "glEnable" => gl_enable as usize,
      "glDebugMessageCallback" => gl_debug_message_callback as usize,
      "glDebugMessageCallbackKHR" => gl_debug_message_callback_khr as usize,
      "glDebugMessageCallbackARB" => gl_debug_message_callback_arb as usize,

      "eglGetCurrentDisplay" if self.platform == Platform::Egl => get_current_display as usize,
      "eglGetCurrentContext" if self.platform == Platform::Egl => get_current_context as usize,
      "eglMakeCurrent" if self.platform == Platform::Egl => egl_make_current as usize,
      "eglDestroyContext" if self.platform == Platform::Egl => egl_destroy_context as usize,
      "eglQueryString" if self.platform == Platform::Egl => egl_query_string as usize,

      "glXGetCurrentDisplay" if self.platform == Platform::Glx => get_current_display as usize,
      "glXGetCurrentContext" if self.platform == Platform::Glx => get_current_context as usize,
      "glXMakeCurrent" if self.platform == Platform::Glx => glx_make_current as usize,
      "glXMakeContextCurrent" if self.platform == Platform::Glx => {
        glx_make_context_current as usize
      }
      "glXMakeCurrentReadSGI" if self.platform == Platform::Glx => {
        glx_make_context_current as usize
      }
      "glXDestroyContext" if self.platform == Platform::Glx => glx_destroy_context as usize,
      "glXQueryVersion" if self.platform == Platform::Glx => glx_query_version as usize,
      "glXQueryExtensionsString" if self.platform == Platform::Glx => {
        glx_query_extensions_string as usize
      }

      _ => return None,
    };
    NonNull::new(address as *mut c_void)
  }
}

extern "system" fn gl_get_error() -> GLenum {
  with(|driver| driver.pending_errors.pop_front().unwrap_or(gl::NO_ERROR))
}

extern "system" fn gl_get_string(name: GLenum) -> *const GLubyte {
  with(|driver| {
    let string = match name {
      gl::VERSION => driver.version_string.clone(),
      gl::EXTENSIONS => driver.extensions_string.clone(),
      gl::VENDOR => Some("Cardboard".to_owned()),
      gl::RENDERER => Some("Fake Renderer".to_owned()),
      gl::SHADING_LANGUAGE_VERSION => Some("OpenGL ES GLSL ES 1.00".to_owned()),
      _ => {
        driver.pending_errors.push_back(gl::INVALID_ENUM);
        None
      }
    };
    leak_string(string)
  })
}

unsafe extern "system" fn gl_get_integerv(name: GLenum, data: *mut GLint) {
  let value = with(|driver| {
    let es3 = driver.major.is_some();
    let value = match name {
      gl::MAJOR_VERSION => driver.major,
      gl::MINOR_VERSION if es3 => Some(driver.minor),
      gl::NUM_EXTENSIONS if es3 => {
        Some(driver.indexed_extensions.len() as GLint + driver.broken_indexed_extensions)
      }
      gl::CONTEXT_FLAGS if es3 => Some(driver.context_flags),
      gl::desktop::CONTEXT_PROFILE_MASK if es3 => Some(driver.profile_mask),
      _ => None,
    };
    if value.is_none() {
      driver.pending_errors.push_back(gl::INVALID_ENUM);
    }
    value
  });
  if let Some(value) = value {
    *data = value;
  }
}

extern "system" fn gl_get_stringi(name: GLenum, index: GLuint) -> *const GLubyte {
  with(|driver| {
    if name != gl::EXTENSIONS {
      driver.pending_errors.push_back(gl::INVALID_ENUM);
      return ptr::null();
    }
    leak_string(driver.indexed_extensions.get(index as usize).cloned())
  })
}

extern "system" fn gl_enable(capability: GLenum) {
  with(|driver| driver.enabled.push(capability));
}

fn set_debug_callback(setter: &'static str, callback: Option<DebugProc>, user_param: *const c_void) {
  with(|driver| {
    driver.callback_setters.push(setter);
    driver.debug_callback = callback.map(|callback| (callback, user_param as usize));
  });
}

extern "system" fn gl_debug_message_callback(callback: Option<DebugProc>, user_param: *const c_void) {
  set_debug_callback("glDebugMessageCallback", callback, user_param);
}

extern "system" fn gl_debug_message_callback_khr(
  callback: Option<DebugProc>,
  user_param: *const c_void,
) {
  set_debug_callback("glDebugMessageCallbackKHR", callback, user_param);
}

extern "system" fn gl_debug_message_callback_arb(
  callback: Option<DebugProc>,
  user_param: *const c_void,
) {
  set_debug_callback("glDebugMessageCallbackARB", callback, user_param);
}

extern "C" fn get_current_display() -> NativeHandle {
  with(|driver| driver.current_display as NativeHandle)
}

extern "C" fn get_current_context() -> NativeHandle {
  with(|driver| driver.current_context as NativeHandle)
}

fn make_current(draw: usize, read: usize, context: usize) -> bool {
  with(|driver| {
    if driver.make_current_succeeds {
      driver.current_context = context;
      driver.made_current.push((draw, read, context));
    }
    driver.make_current_succeeds
  })
}

extern "C" fn egl_make_current(
  _display: NativeHandle,
  draw: NativeHandle,
  read: NativeHandle,
  context: NativeHandle,
) -> EGLBoolean {
  if make_current(draw as usize, read as usize, context as usize) {
    EGL_TRUE
  } else {
    EGL_FALSE
  }
}

extern "C" fn egl_destroy_context(_display: NativeHandle, context: NativeHandle) -> EGLBoolean {
  with(|driver| driver.destroyed.push(context as usize));
  EGL_TRUE
}

extern "C" fn egl_query_string(_display: NativeHandle, name: EGLint) -> *const c_char {
  with(|driver| match name {
    EGL_VERSION => leak_string(driver.egl_version.clone()),
    EGL_EXTENSIONS => leak_string(driver.egl_extensions.clone()),
    _ => ptr::null(),
  })
}

extern "C" fn glx_make_current(
  _display: NativeHandle,
  drawable: c_ulong,
  context: NativeHandle,
) -> c_int {
  make_current(drawable as usize, drawable as usize, context as usize) as c_int
}

extern "C" fn glx_make_context_current(
  _display: NativeHandle,
  draw: c_ulong,
  read: c_ulong,
  context: NativeHandle,
) -> c_int {
  make_current(draw as usize, read as usize, context as usize) as c_int
}

extern "C" fn glx_destroy_context(_display: NativeHandle, context: NativeHandle) {
  with(|driver| driver.destroyed.push(context as usize));
}

unsafe extern "C" fn glx_query_version(
  _display: NativeHandle,
  major: *mut c_int,
  minor: *mut c_int,
) -> c_int {
  match with(|driver| driver.glx_version) {
    Some((glx_major, glx_minor)) => {
      *major = glx_major;
      *minor = glx_minor;
      1
    }
    None => 0,
  }
}

extern "C" fn glx_query_extensions_string(_display: NativeHandle, _screen: c_int) -> *const c_char {
  with(|driver| leak_string(driver.glx_extensions.clone()))
}
