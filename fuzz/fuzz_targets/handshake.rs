#![no_main]

use codec::{decode_handshake, encode_handshake, CodecLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut frame = vec![4u8];
    frame.extend_from_slice(data);
    let Ok(schema) = decode_handshake(&frame, &wire::Limits::for_testing(), &CodecLimits::for_testing())
    else {
        return;
    };
    // Whatever decodes must re-encode
    assert!(encode_handshake(&schema).is_ok());
});
