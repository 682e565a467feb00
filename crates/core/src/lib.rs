mod apply;
mod capture_time;
mod error;
mod exif_reader;
mod metadata;
mod plan_file;
mod planner;
mod raw_reader;
mod sanitize;
mod scan;

#[cfg(test)]
mod fixtures;

pub use apply::{apply_plan, apply_plan_with, ApplyReport, EntryOutcome, Outcome};
pub use capture_time::{
    capture_time_from_bytes, extract_capture_time, read_capture_time, reader_for,
    CaptureTimeReader, METADATA_READ_LIMIT,
};
pub use error::MetadataError;
pub use exif_reader::JpegExifReader;
pub use metadata::{is_supported_extension, ContainerKind, MediaFile, SUPPORTED_EXTENSIONS};
pub use plan_file::{load_plan, save_plan, validate_plan};
pub use planner::{
    build_plan, generate_plan, render_target_name, NamingPolicy, PlanOptions, RenamePlan,
    RenamePlanEntry, RenameStats,
};
pub use raw_reader::TiffRawReader;
pub use sanitize::normalize_topic;
pub use scan::{scan_folder, FolderScan, ScanOptions, ScanStats};
