pub mod files;
pub mod snapshot;

pub use files::{
    atomic_write, ensure_data_dir, ensure_dir, find_local_data_dir, get_data_dir,
    init_local_data_dir, read_file, DATA_DIR_NAME,
};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot};
