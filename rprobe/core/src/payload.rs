use std::time::Duration;

/// Fixed probe target; both shipped variants talk to the same local server.
pub const TARGET_HOST: &str = "localhost";
pub const TARGET_PORT: u16 = 8080;

/// Request bytes for the exchange variant, the one the server answers. The
/// buffer is an opaque literal taken as-is; nothing in here interprets it.
pub const EXCHANGE_PAYLOAD: &[u8] = &[
    0x06, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x3f, 0x3f,
];

/// Request bytes for the one-way variant, sent without reading anything back.
pub const ONEWAY_PAYLOAD: &[u8] = &[
    0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3f, 0x3f, 0x3f, 0x3f, 0x3f, 0x3f,
    0x3f, 0x3f, 0x3f, 0x3f,
];

/// Upper bound on the single reply read.
pub const REPLY_CAPACITY: usize = 1024;

/// How long the one-way variant lingers before closing, giving the server
/// time to drain the request.
pub const ONEWAY_PAUSE: Duration = Duration::from_secs(2);

#[cfg(test)]
mod tests {
    use super::{EXCHANGE_PAYLOAD, ONEWAY_PAYLOAD};

    #[test]
    fn payload_lengths_are_fixed() {
        assert_eq!(16, EXCHANGE_PAYLOAD.len());
        assert_eq!(20, ONEWAY_PAYLOAD.len());
    }

    #[test]
    fn variants_carry_distinct_requests() {
        assert_ne!(EXCHANGE_PAYLOAD, ONEWAY_PAYLOAD);
    }
}
