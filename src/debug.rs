use crate::capabilities::{ContextCapabilities, ContextFlags};
use crate::error::unknown_token;
use crate::impl_prelude::*;
use crate::provider::require_fn;
use prelude_plus::*;

/// The callback signature shared by `glDebugMessageCallback` and its KHR and
/// ARB variants.
pub type DebugProc = extern "system" fn(
  source: GLenum,
  type_: GLenum,
  id: GLuint,
  severity: GLenum,
  length: GLsizei,
  message: *const GLchar,
  user_param: *mut c_void,
);

type DebugMessageCallbackFn =
  unsafe extern "system" fn(callback: Option<DebugProc>, user_param: *const c_void);

// ARB_debug_output uses the same token values, minus the marker and group
// types it doesn't have.
gl_enum!({
  pub enum DebugMessageSource {
    Api = gl::DEBUG_SOURCE_API => "API",
    WindowSystem = gl::DEBUG_SOURCE_WINDOW_SYSTEM => "WINDOW SYSTEM",
    ShaderCompiler = gl::DEBUG_SOURCE_SHADER_COMPILER => "SHADER COMPILER",
    ThirdParty = gl::DEBUG_SOURCE_THIRD_PARTY => "THIRD PARTY",
    Application = gl::DEBUG_SOURCE_APPLICATION => "APPLICATION",
    Other = gl::DEBUG_SOURCE_OTHER => "OTHER",
  }
});

gl_enum!({
  pub enum DebugMessageType {
    Error = gl::DEBUG_TYPE_ERROR => "ERROR",
    DeprecatedBehavior = gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "DEPRECATED BEHAVIOR",
    UndefinedBehavior = gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "UNDEFINED BEHAVIOR",
    Portability = gl::DEBUG_TYPE_PORTABILITY => "PORTABILITY",
    Performance = gl::DEBUG_TYPE_PERFORMANCE => "PERFORMANCE",
    Other = gl::DEBUG_TYPE_OTHER => "OTHER",
    Marker = gl::DEBUG_TYPE_MARKER => "MARKER",
    PushGroup = gl::DEBUG_TYPE_PUSH_GROUP => "PUSH GROUP",
    PopGroup = gl::DEBUG_TYPE_POP_GROUP => "POP GROUP",
  }
});

gl_enum!({
  pub enum DebugMessageSeverity {
    High = gl::DEBUG_SEVERITY_HIGH => "HIGH",
    Medium = gl::DEBUG_SEVERITY_MEDIUM => "MEDIUM",
    Low = gl::DEBUG_SEVERITY_LOW => "LOW",
    Notification = gl::DEBUG_SEVERITY_NOTIFICATION => "NOTIFICATION",
  }
});

impl DebugMessageSeverity {
  pub fn log_level(&self) -> LogLevel {
    match self {
      Self::High => LogLevel::Error,
      Self::Medium => LogLevel::Warn,
      Self::Low => LogLevel::Info,
      Self::Notification => LogLevel::Debug,
    }
  }
}

/// The ways a driver may deliver debug messages, best first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DebugMechanism {
  Core,
  Khr,
  Arb,
}

impl DebugMechanism {
  pub const BY_PRIORITY: [Self; 3] = [Self::Core, Self::Khr, Self::Arb];

  /// The capability token which makes this mechanism available.
  pub fn token(self) -> &'static str {
    match self {
      Self::Core => "OpenGL ES32",
      Self::Khr => "GL_KHR_debug",
      Self::Arb => "GL_ARB_debug_output",
    }
  }

  pub fn entry_point(self) -> &'static str {
    match self {
      Self::Core => "glDebugMessageCallback",
      Self::Khr => "glDebugMessageCallbackKHR",
      Self::Arb => "glDebugMessageCallbackARB",
    }
  }

  fn header(self) -> &'static str {
    match self {
      Self::Core | Self::Khr => "OpenGL ES debug message",
      Self::Arb => "ARB_debug_output message",
    }
  }

  /// Whether `GL_DEBUG_OUTPUT` has to be switched on for messages to arrive.
  fn has_debug_output_switch(self) -> bool { !matches!(self, Self::Arb) }

  pub fn select(capabilities: &ContextCapabilities) -> Option<Self> {
    Self::BY_PRIORITY.iter().copied().find(|mechanism| capabilities.is_supported(mechanism.token()))
  }
}

fn label_of(label: Option<&'static str>, token: GLenum) -> Cow<'static, str> {
  match label {
    Some(label) => Cow::Borrowed(label),
    None => Cow::Owned(unknown_token(token)),
  }
}

/// Renders a debug message into the multi-line block written to the debug
/// output, trailing newline included.
pub fn format_debug_message(
  mechanism: DebugMechanism,
  source: GLenum,
  type_: GLenum,
  id: GLuint,
  severity: GLenum,
  message: &str,
) -> String {
  format!(
    "[cardboard_gles] {}\n\tID: 0x{:X}\n\tSource: {}\n\tType: {}\n\tSeverity: {}\n\tMessage: {}\n",
    mechanism.header(),
    id,
    label_of(DebugMessageSource::from_raw(source).map(|v| v.label()), source),
    label_of(DebugMessageType::from_raw(type_).map(|v| v.label()), type_),
    label_of(DebugMessageSeverity::from_raw(severity).map(|v| v.label()), severity),
    message,
  )
}

/// Where formatted debug messages end up.
pub enum DebugOutput {
  Stderr,
  /// Through the `log` facade, at a level picked by the message severity.
  Log,
  Writer(Box<dyn Write + Send>),
}

impl Default for DebugOutput {
  fn default() -> Self { Self::Stderr }
}

impl fmt::Debug for DebugOutput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Stderr => "Stderr",
      Self::Log => "Log",
      Self::Writer(_) => "Writer(..)",
    })
  }
}

impl DebugOutput {
  // Errors are dropped, there is nobody to report them to from inside the
  // driver.
  fn write_message(&mut self, severity: GLenum, text: &str) {
    match self {
      Self::Stderr => {
        let _ = io::stderr().write_all(text.as_bytes());
      }
      Self::Log => {
        let level = DebugMessageSeverity::from_raw(severity)
          .map_or(LogLevel::Debug, |severity| severity.log_level());
        log!(level, "{}", text.trim_end());
      }
      Self::Writer(writer) => {
        let _ = writer.write_all(text.as_bytes()).and_then(|()| writer.flush());
      }
    }
  }
}

struct CallbackState {
  mechanism: DebugMechanism,
  output: Mutex<DebugOutput>,
}

extern "system" fn debug_message_callback(
  source: GLenum,
  type_: GLenum,
  id: GLuint,
  severity: GLenum,
  length: GLsizei,
  message: *const GLchar,
  user_param: *mut c_void,
) {
  if user_param.is_null() || message.is_null() {
    return;
  }
  let state = unsafe { &*(user_param as *const CallbackState) };

  let message = if length < 0 {
    unsafe { CStr::from_ptr(message) }.to_string_lossy()
  } else {
    let bytes = unsafe { slice::from_raw_parts(message as *const u8, length as usize) };
    String::from_utf8_lossy(bytes)
  };

  let text = format_debug_message(state.mechanism, source, type_, id, severity, &message);
  state.output.lock().unwrap_or_else(PoisonError::into_inner).write_message(severity, &text);
}

struct InstalledCallback {
  set_callback: DebugMessageCallbackFn,
  state: Box<CallbackState>,
}

/// Keeps a debug callback installed. Dropping (or [releasing](Self::release))
/// it uninstalls the callback, which must happen while the context is still
/// alive and current.
#[must_use = "the debug callback is uninstalled as soon as the handle is dropped"]
pub struct DebugMessageCallback {
  installed: Option<InstalledCallback>,
}

impl DebugMessageCallback {
  fn inert() -> Self { Self { installed: None } }

  pub fn mechanism(&self) -> Option<DebugMechanism> {
    self.installed.as_ref().map(|installed| installed.state.mechanism)
  }

  pub fn is_installed(&self) -> bool { self.installed.is_some() }

  pub fn release(self) {}
}

impl Drop for DebugMessageCallback {
  fn drop(&mut self) {
    if let Some(installed) = self.installed.take() {
      unsafe { (installed.set_callback)(None, ptr::null()) };
      drop(installed.state);
    }
  }
}

impl fmt::Debug for DebugMessageCallback {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.installed {
      Some(installed) => write!(
        f,
        "DebugMessageCallback#<{:p}> {{ mechanism: {:?} }}",
        &*installed.state, installed.state.mechanism,
      ),
      None => f.write_str("DebugMessageCallback(inert)"),
    }
  }
}

impl Context {
  /// Routes the driver's debug messages to stderr using the best mechanism the
  /// context supports.
  pub fn setup_debug_message_callback(&self) -> GlesResult<DebugMessageCallback> {
    self.setup_debug_message_callback_with(DebugOutput::default())
  }

  pub fn setup_debug_message_callback_with(
    &self,
    output: DebugOutput,
  ) -> GlesResult<DebugMessageCallback> {
    let capabilities = self.capabilities();
    let mechanism = match DebugMechanism::select(capabilities) {
      Some(mechanism) => mechanism,
      None => {
        warn!("No debug output implementation is available.");
        return Ok(DebugMessageCallback::inert());
      }
    };

    let set_callback: DebugMessageCallbackFn =
      unsafe { require_fn(self.provider(), mechanism.entry_point())? };
    info!("Using {} for debug output", mechanism.entry_point());

    let state = Box::new(CallbackState { mechanism, output: Mutex::new(output) });
    unsafe {
      set_callback(Some(debug_message_callback), &*state as *const CallbackState as *const c_void)
    };

    if mechanism.has_debug_output_switch()
      && !capabilities.context_flags.contains(ContextFlags::DEBUG)
    {
      warn!("A non-debug context may not produce any debug output.");
      unsafe { self.raw_gl().Enable(gl::DEBUG_OUTPUT) };
    }

    Ok(DebugMessageCallback { installed: Some(InstalledCallback { set_callback, state }) })
  }
}
