//! Frame round-trip and corruption coverage.

use proptest::prelude::*;
use wiki_hash::Ident;
use wiki_message::Message;

proptest! {
    #[test]
    fn sync_roundtrips(tips in proptest::collection::vec(("[a-z]{1,20}", any::<[u8; 32]>()), 0..8)) {
        let tips: Vec<(String, Ident)> = tips
            .into_iter()
            .map(|(branch, raw)| (branch, Ident::from_raw(raw)))
            .collect();
        let msg = Message::Sync { tips };
        prop_assert_eq!(Message::decode(&msg.encode()), Some(msg));
    }

    #[test]
    fn single_bit_flip_never_decodes_to_a_different_message(
        raw in any::<[u8; 32]>(),
        bit in 0usize..((22 + 34) * 8),
    ) {
        // A fetch frame: 22 header/checksum bytes plus the 34-byte payload
        // field (u16 length + 32 ident bytes).
        let msg = Message::Fetch { ident: Ident::from_raw(raw) };
        let mut data = msg.encode();
        prop_assume!(bit / 8 < data.len());
        data[bit / 8] ^= 1 << (bit % 8);

        // The checksum catches the flip: the frame is dropped, never
        // misread.
        prop_assert_eq!(Message::decode(&data), None);
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _ = Message::decode(&data);
    }
}
