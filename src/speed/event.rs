/// What a fetch worker reports to the aggregator.
///
/// Every worker emits any number of `Data` events followed by exactly one `Done`,
/// whether its download succeeded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEvent {
    /// Size in bytes of one chunk read from the response body
    Data(usize),
    Done,
}
