//! Process-wide state: the function provider shared by every context, and the
//! context current on each thread.

use crate::capabilities::ContextCapabilities;
use crate::config::GlesConfig;
use crate::impl_prelude::*;
use crate::provider::NativeFunctionProvider;
use prelude_plus::*;

static FUNCTION_PROVIDER: Mutex<Option<Arc<NativeFunctionProvider>>> = Mutex::new(None);

thread_local! {
  static CURRENT_CONTEXT: RefCell<Option<RcWeak<Context>>> = RefCell::new(None);
}

fn lock_provider() -> MutexGuard<'static, Option<Arc<NativeFunctionProvider>>> {
  FUNCTION_PROVIDER.lock().unwrap_or_else(PoisonError::into_inner)
}

fn load_configured(config: &GlesConfig) -> GlesResult<NativeFunctionProvider> {
  let platform = Platform::detect(config)?;
  let library_name =
    config.library_name.as_deref().unwrap_or_else(|| platform.default_library_name());
  NativeFunctionProvider::load(platform, library_name)
}

/// Loads the driver library picked by the configuration (or the platform's
/// default one).
pub fn create() -> GlesResult<()> {
  let mut slot = lock_provider();
  if slot.is_some() {
    return Err(already_created_error());
  }
  *slot = Some(Arc::new(load_configured(GlesConfig::global())?));
  Ok(())
}

/// Loads `library_name` as the driver of `platform`.
pub fn create_with(platform: Platform, library_name: &str) -> GlesResult<()> {
  let mut slot = lock_provider();
  if slot.is_some() {
    return Err(already_created_error());
  }
  *slot = Some(Arc::new(NativeFunctionProvider::load(platform, library_name)?));
  Ok(())
}

fn already_created_error() -> GlesError { GlesError::fatal("OpenGL ES has already been created.") }

/// Unloads the driver library. Contexts which are still alive must not be used
/// afterwards: their entry points dangle, and further lookups through the
/// released provider panic.
pub fn destroy() {
  if let Some(provider) = lock_provider().take() {
    provider.release();
  }
}

pub fn is_created() -> bool { lock_provider().is_some() }

/// Returns the process-wide function provider, loading the driver first if
/// that hasn't been done yet and the configuration allows it.
pub fn function_provider() -> GlesResult<Arc<NativeFunctionProvider>> {
  function_provider_with(GlesConfig::global())
}

/// Same as [`function_provider`], with the driver picked by `config` instead
/// of the environment.
pub fn function_provider_with(config: &GlesConfig) -> GlesResult<Arc<NativeFunctionProvider>> {
  let mut slot = lock_provider();
  if let Some(provider) = &*slot {
    return Ok(Arc::clone(provider));
  }

  if config.explicit_init {
    return Err(GlesError::fatal(
      "OpenGL ES has not been created, call gles::create() before using it.",
    ));
  }

  debug!("Loading the OpenGL ES driver on first use");
  let provider = Arc::new(load_configured(config)?);
  *slot = Some(Arc::clone(&provider));
  Ok(provider)
}

/// Negotiates the capabilities of the context current on the calling thread
/// without adopting it.
pub fn create_capabilities(forward_compatible: bool) -> GlesResult<ContextCapabilities> {
  let provider = function_provider()?;
  ContextCapabilities::negotiate(&*provider, forward_compatible, GlesConfig::global().max_version)
}

/// Replaces the calling thread's current context. Only the bookkeeping is
/// touched, nothing is made current in the driver.
pub fn set_current(context: Option<&SharedContext>) {
  CURRENT_CONTEXT.with(|slot| *slot.borrow_mut() = context.map(Rc::downgrade));
}

pub fn current() -> Option<SharedContext> {
  CURRENT_CONTEXT.with(|slot| slot.borrow().as_ref().and_then(RcWeak::upgrade))
}

/// The capabilities of the calling thread's current context.
pub fn capabilities() -> GlesResult<Rc<ContextCapabilities>> {
  match current() {
    Some(context) => Ok(context.shared_capabilities()),
    None => Err(GlesError::fatal("No OpenGL ES context is current in the current thread.")),
  }
}

pub(crate) fn forget_if_current(context: &Context) {
  CURRENT_CONTEXT.with(|slot| {
    let mut slot = slot.borrow_mut();
    if slot.as_ref().map_or(false, |current| ptr::eq(current.as_ptr(), context)) {
      *slot = None;
    }
  });
}
