mod object_store_transfer;
mod store_factory;
mod store_resolver;

pub use object_store_transfer::{DEFAULT_MULTIPART_THRESHOLD, ObjectStoreTransfer};
pub use store_factory::StoreFactory;
pub use store_resolver::{ResolveError, ResolvedObject, StoreResolver};
