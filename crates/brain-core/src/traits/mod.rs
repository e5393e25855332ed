mod store;

pub use store::{IRecordStore, IRecordWriter, PageRow, RecordPatch};
