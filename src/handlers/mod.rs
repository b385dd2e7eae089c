pub mod media;
pub mod static_files;
pub mod upload;

pub use media::{
    create_media_handler, delete_media_handler, list_media_handler, update_media_handler,
};
pub use static_files::serve_static_handler;
pub use upload::upload_handler;
