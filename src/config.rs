use crate::version::ApiVersion;
use prelude_plus::*;

pub const LIBRARY_NAME_VAR: &str = "CARDBOARD_GLES_LIBNAME";
pub const PLATFORM_VAR: &str = "CARDBOARD_GLES_PLATFORM";
pub const EXPLICIT_INIT_VAR: &str = "CARDBOARD_GLES_EXPLICIT_INIT";
pub const MAX_VERSION_VAR: &str = "CARDBOARD_GLES_MAX_VERSION";

/// Process-wide knobs, normally read from the environment once.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct GlesConfig {
  /// Overrides the platform's default driver library.
  pub library_name: Option<String>,
  /// Overrides the windowing system picked for the current OS.
  pub platform: Option<String>,
  /// When set, the driver is only loaded by an explicit `gles::create` call
  /// instead of on first use.
  pub explicit_init: bool,
  /// Caps the version tokens reported in capabilities.
  pub max_version: Option<ApiVersion>,
}

impl GlesConfig {
  pub fn from_env() -> Self { Self::from_lookup(|name| env::var(name).ok()) }

  pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
    let mut config = Self::default();

    config.library_name = lookup(LIBRARY_NAME_VAR).filter(|name| !name.trim().is_empty());
    config.platform = lookup(PLATFORM_VAR).filter(|name| !name.trim().is_empty());

    if let Some(value) = lookup(EXPLICIT_INIT_VAR) {
      config.explicit_init = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "" | "0" | "false" | "no" | "off" => false,
        _ => {
          warn!("Ignoring invalid value of {}: {:?}", EXPLICIT_INIT_VAR, value);
          false
        }
      };
    }

    if let Some(value) = lookup(MAX_VERSION_VAR) {
      config.max_version = ApiVersion::parse(&value);
      if config.max_version.is_none() {
        warn!("Ignoring invalid value of {}: {:?}", MAX_VERSION_VAR, value);
      }
    }

    config
  }

  /// The configuration read from the environment on first access.
  pub fn global() -> &'static Self {
    static GLOBAL: OnceLock<GlesConfig> = OnceLock::new();
    GLOBAL.get_or_init(Self::from_env)
  }
}
