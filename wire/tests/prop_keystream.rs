use proptest::prelude::*;
use wire::{crypt_rpc_frame, EnterWorldRequest, Keystream, Limits, KEYSTREAM_LEN};

proptest! {
    #[test]
    fn prop_derive_is_deterministic(
        version in any::<u32>(),
        path in prop::collection::vec(any::<u8>(), 0..64),
        pow in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let a = Keystream::derive(version, &path, &pow);
        let b = Keystream::derive(version, &path, &pow);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.as_bytes().len(), KEYSTREAM_LEN);
    }

    #[test]
    fn prop_only_low_version_byte_matters(
        version in any::<u32>(),
        path in prop::collection::vec(any::<u8>(), 0..16),
        pow in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let low = version & 0xFF;
        prop_assert_eq!(
            Keystream::derive(version, &path, &pow),
            Keystream::derive(low, &path, &pow)
        );
    }

    #[test]
    fn prop_cipher_is_self_inverse(
        frame in prop::collection::vec(any::<u8>(), 0..256),
        key in any::<[u8; 8]>(),
    ) {
        let key = Keystream::from(key);
        let once = crypt_rpc_frame(&frame, &key);
        prop_assert_eq!(once.len(), frame.len());
        if let Some(first) = frame.first() {
            prop_assert_eq!(once[0], *first);
        }
        prop_assert_eq!(crypt_rpc_frame(&once, &key), frame);
    }

    #[test]
    fn prop_enter_world_request_roundtrip(
        name in "[a-zA-Z0-9 ]{0,32}",
        version in any::<u32>(),
        pow in prop::collection::vec(any::<u8>(), 0..=255),
    ) {
        let request = EnterWorldRequest {
            display_name: name,
            version,
            proof_of_work: pow,
        };
        let bytes = request.encode().unwrap();
        let decoded = EnterWorldRequest::decode(&bytes, &Limits::default()).unwrap();
        prop_assert_eq!(decoded, request);
    }
}
