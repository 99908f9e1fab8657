pub mod bucket_file_store;

pub use bucket_file_store::BucketFileStore;
