//! Prints what the OpenGL ES driver of this machine supports, using a headless
//! EGL context.

use cardboard_gles::platform::egl;
use cardboard_gles::{
  gles, ApiVersion, Context, DebugOutput, FunctionProvider, GlesConfig, Platform,
};
use prelude_plus::*;

const PBUFFER_SIZE: (u32, u32) = (16, 16);

fn main() -> AnyResult<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  gles::create().context("Failed to load the OpenGL ES driver")?;
  let provider = gles::function_provider()?;
  if provider.platform() != Platform::Egl {
    bail!("gles-info only works with EGL, but {:?} is configured", provider.platform());
  }

  let requested = GlesConfig::global().max_version.unwrap_or(ApiVersion::new(2, 0));
  let surface = egl::create_pbuffer_context(&*provider, PBUFFER_SIZE, requested, true)
    .with_context(|| format!("Failed to create an OpenGL ES {} context", requested))?;

  let result = print_context_info();
  if let Err(err) = surface.destroy() {
    warn!("{}", err);
  }
  gles::destroy();
  result
}

fn print_context_info() -> AnyResult<()> {
  let context = Context::create_from_current()?;
  let capabilities = context.capabilities();

  println!("version:            {}", capabilities.version);
  println!("forward compatible: {}", capabilities.forward_compatible);
  println!("context flags:      {:?}", capabilities.context_flags);
  println!("vendor:             {}", capabilities.vendor.as_deref().unwrap_or("?"));
  println!("renderer:           {}", capabilities.renderer.as_deref().unwrap_or("?"));
  println!("version string:     {}", capabilities.version_string.as_deref().unwrap_or("?"));
  println!("GLSL version:       {}", capabilities.glsl_version.as_deref().unwrap_or("?"));
  println!("supported:");
  for token in capabilities.sorted_tokens() {
    println!("  {}", token);
  }

  let callback = context.setup_debug_message_callback_with(DebugOutput::Log)?;
  match callback.mechanism() {
    Some(mechanism) => println!("debug output:       {:?}", mechanism),
    None => println!("debug output:       none"),
  }
  context.check_gl_error()?;
  callback.release();

  context.destroy()?;
  Ok(())
}
