mod identity;
mod path;
mod paths;
mod resource;

pub use identity::PathCasing;
pub use identity::UriIdentity;
pub use path::clean_utf8_path;
pub use path::Utf8PathClean;
pub use paths::path_to_url;
pub use paths::url_to_path;
pub use resource::schemes;
pub use resource::Resource;
pub use resource::ResourceError;
