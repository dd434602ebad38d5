/// Observability counters mirroring the source's item-layer stats fields.
///
/// `item_curr`, `item_keyval_byte`, and `item_val_byte` are gauges (can go down); the rest are
/// monotonic counters. All updates happen under single-threaded ops, so plain integers suffice —
/// no atomics (see the concurrency model this crate targets).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub item_req: u64,
    pub item_req_ex: u64,
    pub item_link: u64,
    pub item_unlink: u64,
    pub item_remove: u64,
    pub item_curr: i64,
    pub item_keyval_byte: i64,
    pub item_val_byte: i64,
}
