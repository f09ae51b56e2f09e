#![no_main]

use codec::{load, CodecResult, Quaternion, Serializable, Serializer};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Everything {
    flag: bool,
    count: Option<u32>,
    offset: i64,
    speed: f32,
    name: Option<String>,
    items: Option<Vec<i32>>,
    blob: Option<Vec<u8>>,
    rotation: Quaternion,
    nested: Option<Vec<Option<String>>>,
}

impl Serializable for Everything {
    fn serialize(&mut self, s: &mut Serializer<'_>) -> CodecResult<()> {
        s.value(&mut self.flag, true)?;
        s.nullable(&mut self.count, true)?;
        s.value(&mut self.offset, true)?;
        s.value(&mut self.speed, true)?;
        s.string(&mut self.name, true)?;
        s.array(&mut self.items, true)?;
        s.bytes(&mut self.blob, false)?;
        s.value(&mut self.rotation, true)?;
        s.array(&mut self.nested, false)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut value = Everything::default();
    if let Ok(read) = load(&mut value, data) {
        assert!(read <= data.len());
    }
});
