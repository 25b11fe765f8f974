//! revcache Events - Lifecycle Notification Adapter
//!
//! The host versioning subsystem announces user deletion, file deletion,
//! version deletion and version rollback. Each of these invalidates cached
//! artifacts; this crate decodes the notification and prunes the store.
//!
//! | Hook | Store call |
//! |---|---|
//! | `OC_User/pre_deleteUser` | drop the owner namespace |
//! | `OC_Filesystem/delete` | drop every version of the file |
//! | `\OCP\Versions/preDelete` | drop one version |
//! | `\OCP\Versions/rollback` | drop the version rolled back to |

mod adapter;
mod signal;

pub use adapter::{HookOutcome, LifecycleAdapter};
pub use signal::{
    split_path_version, HookParams, LifecycleEvent, LifecycleSignal, VERSION_PATH_MARKER,
};
