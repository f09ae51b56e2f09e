#![no_main]

use bitstream::BitStream;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut stream = BitStream::from_slice(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        match op {
            0 => {
                let _ = stream.read_bit();
            }
            1 => {
                let bits = (data[idx.saturating_sub(1)] % 64).saturating_add(1);
                let _ = stream.read_bits(bits);
            }
            2 => {
                let _ = stream.align_to_byte();
            }
            3 => {
                let mut buf = [0u8; 5];
                let _ = stream.read_bytes(&mut buf);
            }
            4 => {
                let position = usize::from(data[idx.saturating_sub(1)]);
                let _ = stream.set_bit_position(position);
            }
            5 => {
                stream.write_bit(data[idx.saturating_sub(1)] & 1 == 1);
            }
            _ => {
                let _ = stream.read_byte();
            }
        }
        assert!(stream.bit_position() <= stream.len() * 8);
    }
});
