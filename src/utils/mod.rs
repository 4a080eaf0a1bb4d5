pub mod file_copier;

pub use file_copier::{renamed_file_name, CopyReport, FileCopier};
