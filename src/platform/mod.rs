//! Platform abstraction: timers, logging, page reload and task spawning.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod runtime_wasm;
        pub use runtime_wasm::*;
    } else if #[cfg(feature = "native")] {
        mod runtime_native;
        pub use runtime_native::*;
    }
}
