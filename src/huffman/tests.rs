use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{bitstreams::{BinaryReader, BinaryWriterBuilder}, error::Error};

use super::{decoder::CanonicalDecoder, lengths_to_symbols, lengths_to_symbols_into, reverse_bits, CodeTable, DEFLATE_MAX_BITS};

/// Random complete code lengths, built by repeatedly splitting a random leaf.
fn random_lengths(rng: &mut StdRng, n: usize, max_bits: usize) -> Vec<u8> {
    let mut leaves = vec![0u8];
    let target = rng.gen_range(1..=n);

    while leaves.len() < target {
        let i = rng.gen_range(0..leaves.len());
        if leaves[i] as usize >= max_bits {
            if leaves.iter().all(|&l| l as usize >= max_bits) {
                break;
            }
            continue;
        }
        leaves[i] += 1;
        let l = leaves[i];
        leaves.push(l);
    }

    if leaves.len() == 1 {
        leaves[0] = 1;
    }

    let mut lengths = vec![0u8; n];
    let mut slots: Vec<usize> = (0..n).collect();
    for len in leaves {
        let s = slots.swap_remove(rng.gen_range(0..slots.len()));
        lengths[s] = len;
    }
    lengths
}

#[test]
fn test_rfc1951_example() {
    let lengths = [2u32, 1, 3, 3];

    assert_eq!(lengths_to_symbols(&lengths, 3).unwrap(), vec![2, 0, 6, 7]);
}

#[test]
fn test_rfc1951_abcdefgh() {
    // (3, 3, 3, 3, 3, 2, 4, 4) from section 3.2.2.
    let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
    let symbols = lengths_to_symbols(&lengths, 4).unwrap();

    assert_eq!(symbols, vec![0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111]);
}

#[test]
fn test_unused_symbols_untouched() {
    let lengths = [0u16, 2, 0, 1, 2, 0];
    let mut symbols = [u32::MAX; 6];

    lengths_to_symbols_into(&lengths, 5, &mut symbols).unwrap();

    assert_eq!(symbols, [u32::MAX, 2, u32::MAX, 0, 3, u32::MAX]);
}

#[test]
fn test_all_zero_lengths() {
    let symbols = lengths_to_symbols(&[0u8; 19], 7).unwrap();

    assert!(symbols.iter().all(|&s| s == 0));
}

#[test]
fn test_max_bits_larger_than_needed() {
    // Unused deeper tiers do not shift the shallow ones.
    assert_eq!(lengths_to_symbols(&[2u32, 1, 3, 3], 15).unwrap(), vec![2, 0, 6, 7]);
}

#[test]
fn test_length_above_max_bits() {
    let lengths = [2u32, 1, 4, 3];
    let mut symbols = [9u32; 4];

    let err = lengths_to_symbols_into(&lengths, 3, &mut symbols).unwrap_err();

    assert!(matches!(err, Error::LengthExceedsMaxBits { symbol: 2, length: 4, max_bits: 3 }));
    assert_eq!(symbols, [9; 4]);
}

#[test]
fn test_max_bits_too_large() {
    assert!(matches!(lengths_to_symbols(&[1u32, 1], 32), Err(Error::MaxBitsTooLarge { max_bits: 32, .. })));
}

#[test]
fn test_oversubscribed_code_overflow() {
    // Four 1-bit codes push the 31-bit tier base to 4 << 30, past u32.
    let lengths = [1u8, 1, 1, 1, 31];
    let mut symbols = [5u32; 5];

    let err = lengths_to_symbols_into(&lengths, 31, &mut symbols).unwrap_err();

    assert!(matches!(err, Error::CodeOverflow { symbol: 4, length: 31 }));
    assert_eq!(symbols, [5; 5]);
    assert!(matches!(lengths_to_symbols(&lengths, 31), Err(Error::CodeOverflow { length: 31, .. })));
}

#[test]
fn test_buffer_mismatch() {
    let mut symbols = [0u32; 3];

    assert!(matches!(
        lengths_to_symbols_into(&[1u8, 1], 2, &mut symbols),
        Err(Error::LengthMismatch { input: 2, output: 3 })
    ));
}

#[test]
fn test_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let lengths = random_lengths(&mut rng, 288, DEFLATE_MAX_BITS);

    assert_eq!(lengths_to_symbols(&lengths, 15).unwrap(), lengths_to_symbols(&lengths, 15).unwrap());
}

#[test]
fn test_canonical_ordering() {
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..200 {
        let lengths = random_lengths(&mut rng, 64, 9);
        let symbols = lengths_to_symbols(&lengths, 9).unwrap();

        for i in 0..lengths.len() {
            for j in (i + 1)..lengths.len() {
                if lengths[i] != 0 && lengths[i] == lengths[j] {
                    assert!(symbols[i] < symbols[j], "{:?}", lengths);
                }
            }
        }
    }
}

#[test]
fn test_prefix_nesting() {
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..200 {
        let lengths = random_lengths(&mut rng, 100, 12);
        let symbols = lengths_to_symbols(&lengths, 12).unwrap();

        let tier = |l: u8| lengths.iter().zip(symbols.iter()).filter(move |&(&len, _)| len == l).map(|(_, &s)| s);

        for l in 1..12u8 {
            let (Some(min), Some(next_min)) = (tier(l).min(), tier(l + 1).min()) else { continue };
            let count = tier(l).count() as u32;
            assert_eq!(next_min, (min + count) << 1);
        }
    }
}

#[test]
fn test_codes_are_prefix_free() {
    let mut rng = StdRng::seed_from_u64(3);
    let lengths = random_lengths(&mut rng, 30, 8);
    let table = CodeTable::from_lengths(&lengths, 8).unwrap();

    for a in 0..lengths.len() {
        for b in 0..lengths.len() {
            let (Some((ca, la)), Some((cb, lb))) = (table.code(a), table.code(b)) else { continue };
            if a != b && la <= lb {
                assert_ne!(cb >> (lb - la), ca, "{} is a prefix of {}", a, b);
            }
        }
    }
}

#[test]
fn test_round_trip_decoding() {
    let mut rng = StdRng::seed_from_u64(4);

    for _ in 0..50 {
        let lengths = random_lengths(&mut rng, 286, DEFLATE_MAX_BITS);
        let table = CodeTable::from_lengths(&lengths, DEFLATE_MAX_BITS).unwrap();
        let used: Vec<usize> = (0..lengths.len()).filter(|&s| lengths[s] != 0).collect();
        let message: Vec<usize> = (0..500).map(|_| used[rng.gen_range(0..used.len())]).collect();

        let mut writer = BinaryWriterBuilder::new();
        for &s in message.iter() {
            table.write_symbol(s, &mut writer).unwrap();
        }

        let mut reader = BinaryReader::new(writer.build().os);
        let decoder = CanonicalDecoder::from_table(&table).unwrap();

        for &s in message.iter() {
            assert_eq!(decoder.decode(&mut reader).unwrap(), s);
        }
    }
}

#[test]
fn test_decode_every_symbol() {
    let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
    let table = CodeTable::from_lengths(&lengths, 4).unwrap();
    let decoder = CanonicalDecoder::from_lengths(&lengths, 4).unwrap();

    let mut writer = BinaryWriterBuilder::new();
    for s in 0..lengths.len() {
        table.write_symbol(s, &mut writer).unwrap();
    }
    let mut reader = BinaryReader::new(writer.build().os);

    for s in 0..lengths.len() {
        assert_eq!(decoder.decode(&mut reader).unwrap(), s);
    }
}

#[test]
fn test_decode_incomplete_code() {
    // Only "0" is assigned, so "1" followed by anything never matches.
    let decoder = CanonicalDecoder::from_lengths(&[1u8, 0], 2).unwrap();
    let mut reader = BinaryReader::new(vec![0b1100_0000].into_boxed_slice());

    assert!(matches!(decoder.decode(&mut reader), Err(Error::InvalidCode { bits: 2 })));
}

#[test]
fn test_code_table() {
    let table = CodeTable::from_lengths(&[2u32, 1, 0, 3, 3], 3).unwrap();

    assert_eq!(table.len(), 5);
    assert!(!table.is_empty());
    assert_eq!(table.used_symbols(), 4);
    assert_eq!(table.code(0), Some((2, 2)));
    assert_eq!(table.code(1), Some((0, 1)));
    assert_eq!(table.code(2), None);
    assert_eq!(table.code(4), Some((7, 3)));
    assert_eq!(table.code(5), None);

    let mut writer = BinaryWriterBuilder::new();
    assert!(matches!(table.write_symbol(2, &mut writer), Err(Error::UnknownSymbol { symbol: 2 })));
}

#[test]
fn test_code_table_json() {
    let table = CodeTable::from_lengths(&[2u8, 1, 3, 3], 3).unwrap();
    let json = serde_json::to_string(&table).unwrap();

    assert_eq!(json, r#"{"max_bits":3,"lengths":[2,1,3,3],"codes":[2,0,6,7]}"#);
    assert_eq!(serde_json::from_str::<CodeTable>(&json).unwrap(), table);
}

#[test]
fn test_reverse_bits() {
    assert_eq!(reverse_bits(0b110, 3), 0b011);
    assert_eq!(reverse_bits(0b1, 1), 0b1);
    assert_eq!(reverse_bits(0b0010, 4), 0b0100);
    assert_eq!(reverse_bits(0x7FFF, 15), 0x7FFF);
    assert_eq!(reverse_bits(5, 0), 0);
    assert_eq!(reverse_bits(0x8000_0000, 32), 1);
}
