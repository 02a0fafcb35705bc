pub use std::borrow::{Borrow, Cow};
pub use std::cell::{Cell, RefCell};
pub use std::cmp;
pub use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
pub use std::convert::{TryFrom, TryInto};
pub use std::env;
pub use std::ffi::{self, CStr, CString, OsStr, OsString};
pub use std::fmt;
pub use std::io::{self, Write};
pub use std::iter;
pub use std::marker::PhantomData;
pub use std::mem;
pub use std::os::raw::*;
pub use std::ptr::{self, NonNull};
pub use std::rc::{Rc, Weak as RcWeak};
pub use std::slice;
pub use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
pub use std::thread;
pub use std::str;

#[cfg(feature = "anyhow")]
pub use ::anyhow::{
  self, bail, ensure, format_err, Context as ResultContextExt, Error as AnyError,
  Result as AnyResult,
};
#[cfg(feature = "bitflags")]
pub use ::bitflags::bitflags;
#[cfg(feature = "log")]
pub use ::log::{self, debug, error, info, log, log_enabled, trace, warn, Level as LogLevel};
