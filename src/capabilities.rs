use crate::error::translate_error;
use crate::impl_prelude::*;
use crate::provider::{load_fn, require_fn};
use crate::version::{self, ApiVersion, MIN_SUPPORTED_VERSION};
use prelude_plus::*;

// A lost context keeps reporting errors forever, don't spin on it.
const MAX_STALE_ERRORS: usize = 16;

type GetErrorFn = unsafe extern "system" fn() -> GLenum;
type GetStringFn = unsafe extern "system" fn(name: GLenum) -> *const GLubyte;
type GetIntegervFn = unsafe extern "system" fn(pname: GLenum, data: *mut GLint);
type GetStringiFn = unsafe extern "system" fn(name: GLenum, index: GLuint) -> *const GLubyte;

/// The handful of entry points needed to find out what the driver can do. They
/// are resolved by hand since no capabilities exist yet to gate the rest on.
struct QueryFunctions {
  get_error: GetErrorFn,
  get_string: GetStringFn,
  get_integerv: GetIntegervFn,
}

impl QueryFunctions {
  fn load(provider: &dyn FunctionProvider) -> GlesResult<Self> {
    unsafe {
      match (
        load_fn(provider, "glGetError"),
        load_fn(provider, "glGetString"),
        load_fn(provider, "glGetIntegerv"),
      ) {
        (Some(get_error), Some(get_string), Some(get_integerv)) => {
          Ok(Self { get_error, get_string, get_integerv })
        }
        _ => Err(GlesError::fatal(
          "Core OpenGL ES functions could not be found. Make sure that an OpenGL ES context is \
           current in the current thread.",
        )),
      }
    }
  }

  fn error(&self) -> GLenum { unsafe { (self.get_error)() } }

  fn integer(&self, name: GLenum) -> GLint {
    let mut value = 0;
    unsafe { (self.get_integerv)(name, &mut value) };
    value
  }

  /// Queries an integer which older drivers may not know about, `None` if the
  /// query raised an error.
  fn optional_integer(&self, name: GLenum) -> Option<GLint> {
    let value = self.integer(name);
    if self.error() == gl::NO_ERROR {
      Some(value)
    } else {
      None
    }
  }

  fn string(&self, name: GLenum) -> Option<String> {
    unsafe { gl_string_from_ptr((self.get_string)(name)) }
  }
}

unsafe fn gl_string_from_ptr(ptr: *const GLubyte) -> Option<String> {
  if ptr.is_null() {
    None
  } else {
    Some(CStr::from_ptr(ptr as *const c_char).to_string_lossy().into_owned())
  }
}

bitflags! {
  #[derive(Default)]
  pub struct ContextFlags: u32 {
    const FORWARD_COMPATIBLE = gl::desktop::CONTEXT_FLAG_FORWARD_COMPATIBLE_BIT;
    const DEBUG = gl::CONTEXT_FLAG_DEBUG_BIT;
  }
}

/// Everything learned about the driver behind a context. Immutable once
/// negotiated.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct ContextCapabilities {
  pub version: ApiVersion,
  pub forward_compatible: bool,
  pub context_flags: ContextFlags,

  pub vendor: Option<String>,
  pub renderer: Option<String>,
  pub version_string: Option<String>,
  pub glsl_version: Option<String>,

  pub extensions: KnownExtensions,
  supported: HashSet<String>,
}

impl ContextCapabilities {
  /// Finds out what the driver of the context current on the calling thread
  /// supports.
  ///
  /// If `forward_compatible` is set the deprecated functionality should be
  /// treated as unavailable even if the driver exposes it. It is forced on for
  /// forward-compatible and core-profile contexts. `max_version` caps the
  /// reported version tokens.
  pub fn negotiate(
    provider: &dyn FunctionProvider,
    forward_compatible: bool,
    max_version: Option<ApiVersion>,
  ) -> GlesResult<Self> {
    let mut capabilities = Self::negotiate_gl(provider, forward_compatible, max_version)?;
    provider.platform().add_extensions(provider, &mut capabilities.supported)?;
    capabilities.extensions = KnownExtensions::new(capabilities.supported.iter());
    Ok(capabilities)
  }

  /// The OpenGL ES half of [`negotiate`](Self::negotiate), without the
  /// windowing system extensions.
  pub(crate) fn negotiate_gl(
    provider: &dyn FunctionProvider,
    mut forward_compatible: bool,
    max_version: Option<ApiVersion>,
  ) -> GlesResult<Self> {
    let gl = QueryFunctions::load(provider)?;

    for _ in 0..MAX_STALE_ERRORS {
      let code = gl.error();
      if code == gl::NO_ERROR {
        break;
      }
      warn!(
        "An OpenGL ES context was in an error state before the creation of its capabilities \
         instance. Error: {}",
        translate_error(code),
      );
    }

    let version_string = gl.string(gl::VERSION);
    let version = match gl.optional_integer(gl::MAJOR_VERSION) {
      Some(major) if major >= 3 => {
        ApiVersion::new(major as u32, gl.integer(gl::MINOR_VERSION).max(0) as u32)
      }
      _ => {
        let version_string = version_string
          .as_deref()
          .ok_or_else(|| GlesError::fatal("glGetString(GL_VERSION) returned nothing."))?;
        ApiVersion::parse(version_string).ok_or_else(|| {
          GlesError::fatal(format!("Invalid OpenGL ES version string: {:?}", version_string))
        })?
      }
    };

    if version < MIN_SUPPORTED_VERSION {
      return Err(GlesError::fatal(format!(
        "OpenGL ES {} is required, the driver only provides {}.",
        MIN_SUPPORTED_VERSION, version,
      )));
    }

    let mut supported = HashSet::with_capacity(128);
    supported.extend(version::supported_versions(version, max_version).iter().map(|v| v.token()));

    let mut context_flags = ContextFlags::empty();
    if version.major < 3 {
      let list = gl
        .string(gl::EXTENSIONS)
        .ok_or_else(|| GlesError::fatal("glGetString(GL_EXTENSIONS) returned nothing."))?;
      crate::platform::add_space_separated(&mut supported, &list);
    } else {
      let count = gl.integer(gl::NUM_EXTENSIONS).max(0) as GLuint;
      let get_stringi: GetStringiFn = unsafe { require_fn(provider, "glGetStringi")? };
      for index in 0..count {
        match unsafe { gl_string_from_ptr(get_stringi(gl::EXTENSIONS, index)) } {
          Some(name) => {
            supported.insert(name);
          }
          None => warn!("glGetStringi(GL_EXTENSIONS, {}) returned nothing", index),
        }
      }

      // Drivers occasionally expose deprecated functionality on contexts
      // which shouldn't have it and vice versa, only the flags count here.
      context_flags =
        ContextFlags::from_bits_truncate(gl.optional_integer(gl::CONTEXT_FLAGS).unwrap_or(0) as u32);
      if context_flags.contains(ContextFlags::FORWARD_COMPATIBLE) {
        forward_compatible = true;
      } else if version >= ApiVersion::new(3, 2) {
        let profile_mask = gl.optional_integer(gl::desktop::CONTEXT_PROFILE_MASK).unwrap_or(0);
        if profile_mask as GLenum & gl::desktop::CONTEXT_CORE_PROFILE_BIT != 0 {
          forward_compatible = true;
        }
      } else if version >= ApiVersion::new(3, 1) {
        forward_compatible = !supported.contains("GL_ARB_compatibility");
      }
    }

    let capabilities = Self {
      version,
      forward_compatible,
      context_flags,

      vendor: gl.string(gl::VENDOR),
      renderer: gl.string(gl::RENDERER),
      version_string,
      glsl_version: gl.string(gl::SHADING_LANGUAGE_VERSION),

      extensions: KnownExtensions::new(supported.iter()),
      supported,
    };

    info!("GL renderer:    {}", capabilities.renderer.as_deref().unwrap_or("?"));
    info!("GL vendor:      {}", capabilities.vendor.as_deref().unwrap_or("?"));
    info!("GL version:     {}", capabilities.version_string.as_deref().unwrap_or("?"));
    info!("GLSL version:   {}", capabilities.glsl_version.as_deref().unwrap_or("?"));
    debug!("GL extensions:  {:?}", capabilities.extensions);

    Ok(capabilities)
  }

  /// Whether the version or extension token is supported, e.g. `OpenGL ES30`
  /// or `GL_OES_texture_npot`.
  pub fn is_supported(&self, token: &str) -> bool { self.supported.contains(token) }

  pub fn supported(&self) -> &HashSet<String> { &self.supported }

  /// The supported tokens in a stable order, for printing.
  pub fn sorted_tokens(&self) -> Vec<&str> {
    self.supported.iter().map(String::as_str).collect::<BTreeSet<_>>().into_iter().collect()
  }
}

macro_rules! generate_context_extensions_struct {
  ($(($name:literal, $field:ident)),* $(,)?) => {
    /// Typed flags for the tokens this crate branches on.
    #[derive(Debug, Eq, PartialEq, Clone, Hash, Default)]
    pub struct KnownExtensions {
      $(pub $field: bool),*
    }

    impl KnownExtensions {
      fn new<'a, T: IntoIterator<Item = &'a String>>(loaded_extension_names_iter: T) -> Self {
        let mut extensions = KnownExtensions {
          $($field: false),*
        };

        for name in loaded_extension_names_iter {
          match name.as_str() {
            $($name => extensions.$field = true,)*
            _ => {}
          }
        }

        extensions
      }
    }
  };
}

generate_context_extensions_struct![
  ("OpenGL ES30", opengl_es30),
  ("OpenGL ES31", opengl_es31),
  ("OpenGL ES32", opengl_es32),
  ("GL_KHR_debug", gl_khr_debug),
  ("GL_ARB_debug_output", gl_arb_debug_output),
  ("GL_ARB_compatibility", gl_arb_compatibility),
  ("GLX_13", glx_13),
  ("GLX_SGI_make_current_read", glx_sgi_make_current_read),
];
