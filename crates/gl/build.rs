use gl_generator::{Api, DebugStructGenerator, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::Path;

fn main() {
  let dest = env::var("OUT_DIR").unwrap();
  let mut file = File::create(&Path::new(&dest).join("bindings.rs")).unwrap();

  // 3.2 pulls in the core debug output entry points and the context flags
  // queries, the KHR_debug extension adds the suffixed variants.
  let registry =
    Registry::new(Api::Gles2, (3, 2), Profile::Core, Fallbacks::None, ["GL_KHR_debug"]);

  if cfg!(feature = "debug_all_commands") {
    registry.write_bindings(DebugStructGenerator, &mut file)
  } else {
    registry.write_bindings(StructGenerator, &mut file)
  }
  .unwrap();
}
