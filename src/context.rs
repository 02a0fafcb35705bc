use crate::capabilities::ContextCapabilities;
use crate::config::GlesConfig;
use crate::gles;
use crate::impl_prelude::*;
use crate::platform::{Drawable, NativeHandle, PlatformContext};
use crate::version::ApiVersion;
use prelude_plus::*;

pub type RawGL = Gles2;

pub type SharedContext = Rc<Context>;

/// An OpenGL ES context created by someone else (a windowing library, the EGL
/// pbuffer factory) and adopted by this crate.
pub struct Context {
  provider: Arc<dyn FunctionProvider>,
  raw_gl: RawGL,
  capabilities: Rc<ContextCapabilities>,
  platform: PlatformContext,
  destroyed: Cell<bool>,
}

impl Context {
  #[inline(always)]
  pub fn raw_gl(&self) -> &RawGL { &self.raw_gl }
  #[inline(always)]
  pub fn capabilities(&self) -> &ContextCapabilities { &self.capabilities }
  #[inline(always)]
  pub fn shared_capabilities(&self) -> Rc<ContextCapabilities> { Rc::clone(&self.capabilities) }
  #[inline(always)]
  pub fn platform_context(&self) -> &PlatformContext { &self.platform }
  #[inline(always)]
  pub fn provider(&self) -> &dyn FunctionProvider { &*self.provider }
  #[inline(always)]
  pub fn is_destroyed(&self) -> bool { self.destroyed.get() }

  /// Adopts the context current on the calling thread, using the process-wide
  /// function provider.
  pub fn create_from_current() -> GlesResult<SharedContext> { Self::create_from_global(None) }

  /// Same as [`create_from_current`](Self::create_from_current), but with an
  /// explicitly given display connection instead of the current one.
  pub fn create_from_current_display(display: NativeHandle) -> GlesResult<SharedContext> {
    Self::create_from_global(Some(display))
  }

  fn create_from_global(display: Option<NativeHandle>) -> GlesResult<SharedContext> {
    let provider: Arc<dyn FunctionProvider> = gles::function_provider()?;
    Self::create_from_current_with(provider, display, GlesConfig::global().max_version)
  }

  /// Adopts the context current on the calling thread, resolving everything
  /// through `provider`. The new context becomes the thread's current one.
  pub fn create_from_current_with(
    provider: Arc<dyn FunctionProvider>,
    display: Option<NativeHandle>,
    max_version: Option<ApiVersion>,
  ) -> GlesResult<SharedContext> {
    let (display, handle) = provider.platform().current_handles(&*provider, display)?;

    let capabilities = ContextCapabilities::negotiate(&*provider, false, max_version)?;
    let platform = PlatformContext::new(&*provider, display, handle, &capabilities)?;
    let raw_gl = Gles2::load_with(|name| {
      provider.function_address(name).map_or(ptr::null(), |address| address.as_ptr() as *const _)
    });

    let context = Rc::new(Self {
      provider,
      raw_gl,
      capabilities: Rc::new(capabilities),
      platform,
      destroyed: Cell::new(false),
    });
    info!("Adopted {:?} (OpenGL ES {})", context, context.capabilities.version);

    gles::set_current(Some(&context));
    Ok(context)
  }

  fn check_alive(&self) -> GlesResult<()> {
    if self.destroyed.get() {
      Err(GlesError::fatal("The OpenGL ES context has been destroyed."))
    } else {
      Ok(())
    }
  }

  /// Binds the context to the calling thread with `target` as both the draw
  /// and the read drawable. The thread's current context is only updated if
  /// the driver accepted the switch.
  pub fn make_current(self: &Rc<Self>, target: Drawable) -> GlesResult<()> {
    self.check_alive()?;
    self.platform.make_current(target)?;
    gles::set_current(Some(self));
    Ok(())
  }

  /// Like [`make_current`](Self::make_current) with separate draw and read
  /// drawables.
  pub fn make_current_read(self: &Rc<Self>, draw: Drawable, read: Drawable) -> GlesResult<()> {
    self.check_alive()?;
    self.platform.make_current_read(draw, read)?;
    gles::set_current(Some(self));
    Ok(())
  }

  pub fn supports_separate_read(&self) -> bool { self.platform.supports_separate_read() }

  /// Whether the driver reports this context as current on the calling thread.
  pub fn is_current(&self) -> bool { !self.destroyed.get() && self.platform.is_current() }

  /// Destroys the native context. Can be done only once.
  pub fn destroy(&self) -> GlesResult<()> {
    if self.destroyed.replace(true) {
      return Err(GlesError::fatal("The OpenGL ES context has already been destroyed."));
    }
    gles::forget_if_current(self);
    debug!("Destroying {:?}", self);
    self.platform.destroy()
  }

  /// Turns the next pending `glGetError` code into an error.
  pub fn check_gl_error(&self) -> GlesResult<()> {
    match unsafe { self.raw_gl.GetError() } {
      gl::NO_ERROR => Ok(()),
      code => Err(GlesError::Driver(code)),
    }
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Context#<{:p}>", self.platform.handle())
  }
}
