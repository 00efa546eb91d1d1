#![no_main]

use bitstream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((ops, payload)) = data.split_first() else {
        return;
    };
    let mut reader = ByteReader::new(payload).with_max_decompressed(64 * 1024);

    // The first byte seeds a bounded sequence of operations.
    let mut op = *ops;
    for _ in 0..256 {
        if reader.is_empty() {
            break;
        }
        let failed = match op % 10 {
            0 => reader.read_u8().is_err(),
            1 => reader.read_u16().is_err(),
            2 => reader.read_u32().is_err(),
            3 => reader.read_u64().is_err(),
            4 => reader.read_string().is_err(),
            5 => reader.read_compressed_string().is_err(),
            6 => reader.read_i32_vector2().is_err(),
            7 => reader.read_array_i32_vector2().is_err(),
            8 => reader.read_array_u32().is_err(),
            _ => reader.read_array_u8().is_err(),
        };
        if failed {
            break;
        }
        op = op.wrapping_mul(31).wrapping_add(7);
    }
});
