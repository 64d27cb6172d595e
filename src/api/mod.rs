pub mod pagination;
pub mod slug;
pub mod upload;

pub use pagination::{BaseUrl, Page, PageParams, PageQuery};
pub use slug::slugify;
pub use upload::{remove_file, MultipartForm, StoredFile, UploadError, UploadPolicy, UploadedFile};
