//! Browser implementations of the platform functions.

use std::rc::Rc;

use futures::{
    future::LocalFutureObj,
    task::{LocalSpawn, SpawnError},
};

use super::Spawner;

/// Initializes [`wasm_logger`] as the default application logger.
///
/// Filters logs by the [`log::Level::Debug`] in debug builds and by the
/// [`log::Level::Info`] otherwise.
pub fn init_logger() {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
}

/// [`LocalSpawn`] implementation backed by the
/// [`wasm_bindgen_futures::spawn_local`].
struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(
        &self,
        future: LocalFutureObj<'static, ()>,
    ) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

/// Returns [`Spawner`] running futures on the browser's event loop.
#[inline]
pub fn spawner() -> Spawner {
    Rc::new(BrowserSpawner)
}
