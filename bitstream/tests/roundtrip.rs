use bitstream::{ByteReader, ByteWriter, CursorError};

#[test]
fn handshake_like_layout_roundtrip() {
    let mut writer = ByteWriter::new();
    writer.write_u8(4);
    writer.write_u32(27);
    writer.write_string("player").unwrap();
    writer.write_i32_vector2(-1000, 1000);
    writer.write_compressed_string("{\"mode\":\"solo\"}").unwrap();
    let bytes = writer.finish();

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u8().unwrap(), 4);
    assert_eq!(reader.read_u32().unwrap(), 27);
    assert_eq!(reader.read_string().unwrap(), "player");
    assert_eq!(reader.read_i32_vector2().unwrap(), (-1000, 1000));
    assert_eq!(
        reader.read_compressed_string().unwrap(),
        "{\"mode\":\"solo\"}"
    );
    assert!(!reader.can_read(1));
}

#[test]
fn optional_trailer_guarded_by_can_read() {
    let mut writer = ByteWriter::new();
    writer.write_u32(1);
    let bytes = writer.finish();

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u32().unwrap(), 1);
    let trailer = if reader.can_read(1) {
        Some(reader.read_string().unwrap())
    } else {
        None
    };
    assert_eq!(trailer, None);
}

#[test]
fn sixteen_bit_values_are_big_endian_both_ways() {
    let mut writer = ByteWriter::new();
    writer.write_u16(0x0102);
    writer.write_i16(-2);
    let bytes = writer.finish();
    assert_eq!(bytes, vec![0x01, 0x02, 0xFF, 0xFE]);

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u16().unwrap(), 0x0102);
    assert_eq!(reader.read_i16().unwrap(), -2);
}

#[test]
fn truncated_buffer_reports_underflow() {
    let mut writer = ByteWriter::new();
    writer.write_array_u32(&[1, 2, 3]).unwrap();
    let mut bytes = writer.finish();
    bytes.truncate(bytes.len() - 1);

    let mut reader = ByteReader::new(&bytes);
    let err = reader.read_array_u32().unwrap_err();
    assert_eq!(
        err,
        CursorError::BufferUnderflow {
            requested: 12,
            available: 11
        }
    );
}
