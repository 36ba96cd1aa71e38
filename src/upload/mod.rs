mod types;
mod uploader;
mod validator;

pub use types::{
    SelectedFile, UploadReply, UploadResponse, UploadResult, ValidationOutcome, WorkId,
};
pub use uploader::Uploader;
pub use validator::{Validator, REJECT_EXTENSION, REJECT_NO_DELIMITER, REJECT_UNREADABLE};
