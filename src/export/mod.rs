pub(crate) mod backup;
pub(crate) mod encode;

pub use backup::{backup, backup_path, ensure_backup, has_backup, restore};
pub use encode::{
    JPEG_QUALITY, ensure_parent_dir, export_heightmap_png16, export_jpeg, export_png,
    processed_output_path,
};
