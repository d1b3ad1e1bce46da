pub mod photo_list;
pub mod photo_upload;
pub mod uploaded_file;
