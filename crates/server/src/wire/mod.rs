pub mod query;
pub mod response;

/// DNS message header length (RFC 1035 §4.1.1).
pub const HEADER_LEN: usize = 12;

/// QTYPE A (host address).
pub const TYPE_A: u16 = 0x0001;
/// QTYPE * (request for all records); answered as if it were A.
pub const TYPE_ALL: u16 = 0x00ff;
