use crate::impl_prelude::*;
use prelude_plus::*;

pub type GlesResult<T> = Result<T, GlesError>;

/// Everything that can go wrong in this crate. Stale driver errors and missing
/// optional entry points are only logged and never end up here.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum GlesError {
  /// A precondition of the operation doesn't hold: no usable context, a
  /// required entry point is missing, the driver or the windowing system is
  /// too old or not there at all. Retrying won't help.
  #[error("{0}")]
  Fatal(String),
  /// The driver can't do what was asked, e.g. binding separate draw and read
  /// surfaces.
  #[error("unsupported operation: {0}")]
  Unsupported(String),
  /// An error code reported by `glGetError`.
  #[error("{} [0x{:X}]", translate_error(*.0), .0)]
  Driver(GLenum),
}

impl GlesError {
  pub(crate) fn fatal(message: impl Into<String>) -> Self { Self::Fatal(message.into()) }

  pub(crate) fn unsupported(message: impl Into<String>) -> Self {
    Self::Unsupported(message.into())
  }

  pub fn is_fatal(&self) -> bool { matches!(self, Self::Fatal(_)) }
}

gl_enum!({
  pub enum ErrorCode {
    NoError = gl::NO_ERROR => "No error",
    InvalidEnum = gl::INVALID_ENUM => "Enum argument out of range",
    InvalidValue = gl::INVALID_VALUE => "Numeric argument out of range",
    InvalidOperation = gl::INVALID_OPERATION => "Operation illegal in current state",
    StackOverflow = gl::STACK_OVERFLOW => "Command would cause a stack overflow",
    StackUnderflow = gl::STACK_UNDERFLOW => "Command would cause a stack underflow",
    OutOfMemory = gl::OUT_OF_MEMORY => "Not enough memory left to execute command",
    InvalidFramebufferOperation =
      gl::INVALID_FRAMEBUFFER_OPERATION => "Framebuffer object is not complete",
    TableTooLarge = gl::desktop::TABLE_TOO_LARGE => "The specified table is too large",
  }
});

/// Translates a `glGetError` code into a description of the error.
pub fn translate_error(code: GLenum) -> Cow<'static, str> {
  match ErrorCode::from_raw(code) {
    Some(known) => Cow::Borrowed(known.label()),
    None => Cow::Owned(unknown_token(code)),
  }
}

#[inline]
pub(crate) fn unknown_token(token: GLenum) -> String { format!("Unknown (0x{:X})", token) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_known_error_code_has_its_own_label() {
    let labels: HashSet<&str> = ErrorCode::VARIANTS.iter().map(|code| code.label()).collect();
    assert_eq!(labels.len(), ErrorCode::VARIANTS.len());
    for code in ErrorCode::VARIANTS {
      assert_eq!(translate_error(code.as_raw()), code.label());
      assert!(!translate_error(code.as_raw()).starts_with("Unknown"));
    }
  }

  #[test]
  fn unknown_error_codes_are_printed_in_hex() {
    assert_eq!(translate_error(0xDEAD), "Unknown (0xDEAD)");
    assert_eq!(translate_error(0x1), "Unknown (0x1)");
    assert_eq!(translate_error(0x0501), "Numeric argument out of range");
  }

  #[test]
  fn driver_errors_display_translation_and_code() {
    assert_eq!(
      GlesError::Driver(gl::INVALID_OPERATION).to_string(),
      "Operation illegal in current state [0x502]",
    );
    assert_eq!(GlesError::Driver(0x1234).to_string(), "Unknown (0x1234) [0x1234]");
    assert_eq!(GlesError::fatal("no context").to_string(), "no context");
    assert_eq!(
      GlesError::unsupported("separate read drawable").to_string(),
      "unsupported operation: separate read drawable",
    );
    let err: AnyError = GlesError::Driver(gl::OUT_OF_MEMORY).into();
    assert_eq!(err.to_string(), "Not enough memory left to execute command [0x505]");
    assert!(GlesError::fatal("no context").is_fatal());
    assert!(!GlesError::unsupported("separate read drawable").is_fatal());
  }
}
