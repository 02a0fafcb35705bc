use crate::impl_prelude::*;
use libloading::Library;
use prelude_plus::*;

/// Resolves driver entry points by their exact (case-sensitive) names.
pub trait FunctionProvider {
  /// The windowing system the entry points are resolved against.
  fn platform(&self) -> Platform;

  /// Returns `None` when the entry point couldn't be found, callers must check
  /// for that before calling anything.
  fn function_address(&self, name: &str) -> Option<NonNull<c_void>>;
}

/// Resolves `name` and reinterprets the address as the function pointer type
/// `F`.
///
/// # Safety
///
/// `F` must be an `extern` function pointer type matching the real signature
/// of the entry point.
pub(crate) unsafe fn load_fn<F: Copy>(provider: &dyn FunctionProvider, name: &str) -> Option<F> {
  debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*mut c_void>());
  let address = provider.function_address(name)?;
  Some(mem::transmute_copy::<*mut c_void, F>(&address.as_ptr()))
}

/// Same as [`load_fn`], but a missing entry point is a fatal error.
pub(crate) unsafe fn require_fn<F: Copy>(
  provider: &dyn FunctionProvider,
  name: &str,
) -> GlesResult<F> {
  load_fn(provider, name)
    .ok_or_else(|| GlesError::fatal(format!("Failed to retrieve the {} function address.", name)))
}

type GetProcAddressFn = unsafe extern "C" fn(name: *const c_char) -> *mut c_void;

struct LoadedLibraries {
  libraries: Vec<Library>,
  get_proc_address: Option<GetProcAddressFn>,
  // misses are cached too, so each of them is reported only once
  addresses: HashMap<String, Option<usize>>,
}

impl LoadedLibraries {
  fn resolve(&self, name: &str) -> Option<usize> {
    let c_name = CString::new(name).ok()?;

    if let Some(get_proc_address) = self.get_proc_address {
      let address = unsafe { get_proc_address(c_name.as_ptr()) };
      if !address.is_null() {
        return Some(address as usize);
      }
    }

    find_symbol(&self.libraries, &c_name).map(|address| address as usize)
  }
}

fn find_symbol(libraries: &[Library], name: &CStr) -> Option<*mut c_void> {
  libraries.iter().find_map(|library| {
    let symbol = unsafe { library.get::<*mut c_void>(name.to_bytes_with_nul()) }.ok()?;
    let address = *symbol;
    if address.is_null() {
      None
    } else {
      Some(address)
    }
  })
}

/// A [`FunctionProvider`] backed by the driver's shared libraries.
pub struct NativeFunctionProvider {
  platform: Platform,
  state: Mutex<Option<LoadedLibraries>>,
}

impl NativeFunctionProvider {
  /// Opens `library_name` (plus the windowing system library if the platform
  /// keeps its entry points in a separate one).
  pub fn load(platform: Platform, library_name: &str) -> GlesResult<Self> {
    let mut libraries = vec![open_library(library_name)?];

    if let Some(platform_library_name) = platform.platform_library_name() {
      match open_library(platform_library_name) {
        Ok(library) => libraries.push(library),
        // the driver library may link it in already, then the probe below will
        // still find its symbols
        Err(err) => warn!("{}", err),
      }
    }

    let get_proc_address = platform.get_proc_address_names().iter().find_map(|name| {
      let c_name = CString::new(*name).ok()?;
      let address = find_symbol(&libraries, &c_name)?;
      debug!("Resolving OpenGL ES functions through {}", name);
      Some(unsafe { mem::transmute::<*mut c_void, GetProcAddressFn>(address) })
    });
    if get_proc_address.is_none() {
      debug!("No {:?} proc address lookup found, using plain symbol lookups", platform);
    }

    Ok(Self {
      platform,
      state: Mutex::new(Some(LoadedLibraries {
        libraries,
        get_proc_address,
        addresses: HashMap::new(),
      })),
    })
  }

  /// Unloads the libraries. Every address handed out so far becomes dangling,
  /// and further lookups panic.
  pub fn release(&self) {
    let state = self.state.lock().unwrap_or_else(PoisonError::into_inner).take();
    match state {
      Some(state) => {
        debug!("Releasing {} OpenGL ES libraries", state.libraries.len());
        drop(state);
      }
      None => warn!("The OpenGL ES libraries have already been released"),
    }
  }

  pub fn is_released(&self) -> bool {
    self.state.lock().unwrap_or_else(PoisonError::into_inner).is_none()
  }
}

impl FunctionProvider for NativeFunctionProvider {
  #[inline(always)]
  fn platform(&self) -> Platform { self.platform }

  fn function_address(&self, name: &str) -> Option<NonNull<c_void>> {
    let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
    let state = match &mut *guard {
      Some(state) => state,
      None => resolve_after_release_fail(name),
    };

    let address = match state.addresses.get(name) {
      Some(&cached) => cached,
      None => {
        let address = state.resolve(name);
        if address.is_none() {
          debug!("Failed to locate address for GLES function {}", name);
        }
        state.addresses.insert(name.to_owned(), address);
        address
      }
    };

    address.and_then(|address| NonNull::new(address as *mut c_void))
  }
}

impl fmt::Debug for NativeFunctionProvider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NativeFunctionProvider")
      .field("platform", &self.platform)
      .field("released", &self.is_released())
      .finish()
  }
}

#[inline(never)]
#[cold]
#[track_caller]
fn resolve_after_release_fail(name: &str) -> ! {
  panic!("attempt to resolve {} after the OpenGL ES library has been released", name);
}

pub(crate) fn library_file_name(name: &str) -> OsString {
  let looks_like_file = name.contains('/')
    || name.contains(std::path::MAIN_SEPARATOR)
    || name.contains(".so")
    || name.ends_with(".dll")
    || name.ends_with(".dylib");
  if looks_like_file {
    OsString::from(name)
  } else {
    libloading::library_filename(name)
  }
}

fn open_library(name: &str) -> GlesResult<Library> {
  let file_name = library_file_name(name);
  match unsafe { Library::new(&file_name) } {
    Ok(library) => {
      info!("Loaded {:?}", file_name);
      Ok(library)
    }
    Err(err) => Err(GlesError::fatal(format!(
      "Failed to load the OpenGL ES library {:?}: {}",
      file_name, err,
    ))),
  }
}
