use prelude_plus::*;

/// The highest minor version of every OpenGL ES major release which gets a
/// version token, indexed by `major - 1`.
pub const KNOWN_MINOR_VERSIONS: [u32; 3] = [2, 1, 2];

/// The oldest driver this crate can work with.
pub const MIN_SUPPORTED_VERSION: ApiVersion = ApiVersion::new(1, 1);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ApiVersion {
  pub major: u32,
  pub minor: u32,
}

impl ApiVersion {
  pub const fn new(major: u32, minor: u32) -> Self { Self { major, minor } }

  /// Parses strings starting with `<major>.<minor>`, optionally preceded by
  /// the `OpenGL ES`, `OpenGL ES-CM` or `OpenGL ES-CL` prefix drivers put into
  /// `GL_VERSION`. Whatever follows the minor version (a revision, a release
  /// tag, vendor info) is thrown away.
  pub fn parse(version: &str) -> Option<Self> {
    let mut s = version.trim_start();
    if let Some(rest) = s.strip_prefix("OpenGL ES") {
      s = rest.strip_prefix("-CM").or_else(|| rest.strip_prefix("-CL")).unwrap_or(rest);
      s = s.trim_start();
    }

    let (major, rest) = leading_number(s)?;
    let (minor, _) = leading_number(rest.strip_prefix('.')?)?;
    Some(Self::new(major, minor))
  }

  /// The capability token representing this version, e.g. `OpenGL ES30`.
  pub fn token(&self) -> String { format!("OpenGL ES{}{}", self.major, self.minor) }
}

fn leading_number(s: &str) -> Option<(u32, &str)> {
  let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
  if end == 0 {
    return None;
  }
  Some((s[..end].parse().ok()?, &s[end..]))
}

impl fmt::Display for ApiVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.major, self.minor)
  }
}

/// Lists every version this crate knows about from 1.1 up to `detected`, not
/// going past `ceiling`, in increasing order.
pub fn supported_versions(detected: ApiVersion, ceiling: Option<ApiVersion>) -> Vec<ApiVersion> {
  let mut versions = Vec::new();

  let mut max_major = detected.major.min(KNOWN_MINOR_VERSIONS.len() as u32);
  if let Some(ceiling) = ceiling {
    max_major = max_major.min(ceiling.major);
  }

  for major in 1..=max_major {
    let mut max_minor = KNOWN_MINOR_VERSIONS[major as usize - 1];
    if major == detected.major {
      max_minor = max_minor.min(detected.minor);
    }
    if let Some(ceiling) = ceiling {
      if major == ceiling.major {
        max_minor = max_minor.min(ceiling.minor);
      }
    }

    let min_minor = if major == 1 { 1 } else { 0 };
    versions.extend((min_minor..=max_minor).map(|minor| ApiVersion::new(major, minor)));
  }

  versions
}
