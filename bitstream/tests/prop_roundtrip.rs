use bitstream::BitStream;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u64 },
    Pad,
    Byte(u8),
    Bytes(Vec<u8>),
}

fn mask_value(bits: u8, value: u64) -> u64 {
    if bits >= 64 {
        value
    } else {
        let mask = (1u64 << bits) - 1;
        value & mask
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=64, any::<u64>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        Just(Op::Pad),
        any::<u8>().prop_map(Op::Byte),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Op::Bytes),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = BitStream::new();

        for op in &ops {
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Pad => writer.pad_to_byte(),
                Op::Byte(v) => writer.write_byte(*v),
                Op::Bytes(v) => writer.write_bytes(v),
            }
        }

        let written_bits = writer.bit_position();
        prop_assert_eq!(writer.len(), written_bits.div_ceil(8));

        let mut reader = BitStream::from_vec(writer.into_vec());
        for op in &ops {
            match op {
                Op::Bit(b) => prop_assert_eq!(reader.read_bit().unwrap(), *b),
                Op::Bits { bits, value } => {
                    prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value);
                }
                Op::Pad => reader.align_to_byte().unwrap(),
                Op::Byte(v) => prop_assert_eq!(reader.read_byte().unwrap(), *v),
                Op::Bytes(v) => {
                    let mut out = vec![0u8; v.len()];
                    reader.read_bytes(&mut out).unwrap();
                    prop_assert_eq!(&out, v);
                }
            }
        }
        prop_assert_eq!(reader.bit_position(), written_bits);
    }

    #[test]
    fn prop_reads_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..32), counts in prop::collection::vec(0u8..=70, 0..32)) {
        let mut reader = BitStream::from_vec(bytes);
        for count in counts {
            let _ = reader.read_bits(count);
            prop_assert!(reader.bit_position() <= reader.len() * 8);
        }
    }
}
