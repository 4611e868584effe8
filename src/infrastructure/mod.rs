pub mod gateway;
pub mod in_memory;
pub mod notifier;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
