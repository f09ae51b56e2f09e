//! Serializer benchmarks.
//!
//! These cover the hot paths of a replication tick: packed integers and
//! floats, arrays, and a full object written through a pooled stream.

use std::hint::black_box;

use bitstream::{BitStream, BufferPool, PoolConfig};
use codec::varint::{read_varuint, write_varuint};
use codec::{dump_pooled, load, CodecResult, Quaternion, Serializable, Serializer, Vector3};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

#[derive(Default, Clone)]
struct Entity {
    id: u32,
    alive: bool,
    position: Vector3,
    rotation: Quaternion,
    health: Option<u16>,
    inventory: Option<Vec<u32>>,
}

impl Serializable for Entity {
    fn serialize(&mut self, s: &mut Serializer<'_>) -> CodecResult<()> {
        s.value(&mut self.id, true)?;
        s.value(&mut self.alive, true)?;
        s.value(&mut self.position, true)?;
        s.value(&mut self.rotation, true)?;
        s.nullable(&mut self.health, true)?;
        s.array(&mut self.inventory, true)
    }
}

fn sample_entity() -> Entity {
    Entity {
        id: 12_345,
        alive: true,
        position: [102.5, 3.25, -48.0],
        rotation: Quaternion::new(0.1, 0.7, 0.1, 0.7),
        health: Some(87),
        inventory: Some((0..16).collect()),
    }
}

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");

    let test_values: Vec<(u64, &str)> = vec![
        (0, "zero"),
        (127, "1_byte_max"),
        (16_383, "2_byte_max"),
        (u64::from(u32::MAX), "max_u32"),
        (u64::MAX, "max_u64"),
    ];

    for (value, name) in test_values {
        group.bench_with_input(BenchmarkId::new("write", name), &value, |b, &value| {
            let mut stream = BitStream::with_capacity(16);
            b.iter(|| {
                stream.reset();
                write_varuint(&mut stream, black_box(value));
                black_box(stream.len())
            });
        });

        let mut stream = BitStream::new();
        write_varuint(&mut stream, value);
        let bytes = stream.into_vec();
        group.bench_with_input(BenchmarkId::new("read", name), &bytes, |b, bytes| {
            b.iter(|| {
                let mut stream = BitStream::from_slice(black_box(bytes));
                black_box(read_varuint(&mut stream, 64))
            });
        });
    }

    group.finish();
}

fn bench_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("array");

    for len in [16usize, 256, 4096] {
        let items: Vec<i32> = (0..len as i32).map(|i| i * 37 - 1000).collect();
        group.throughput(Throughput::Elements(len as u64));

        for packed in [true, false] {
            let label = if packed { "packed" } else { "unpacked" };
            group.bench_with_input(BenchmarkId::new(label, len), &items, |b, items| {
                let mut stream = BitStream::with_capacity(len * 5 + 8);
                let mut slot = Some(items.clone());
                b.iter(|| {
                    stream.reset();
                    Serializer::writer(&mut stream)
                        .array(&mut slot, packed)
                        .unwrap();
                    black_box(stream.len())
                });
            });
        }
    }

    group.finish();
}

fn bench_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity");
    let pool = BufferPool::new(PoolConfig::default());
    let mut entity = sample_entity();
    let mut target = [0u8; 256];

    group.bench_function("dump_pooled", |b| {
        b.iter(|| black_box(dump_pooled(&pool, &mut entity, &mut target).unwrap()));
    });

    let written = dump_pooled(&pool, &mut entity, &mut target).unwrap();
    let mut decoded = Entity::default();
    group.bench_function("load", |b| {
        b.iter(|| black_box(load(&mut decoded, black_box(&target[..written])).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_varint, bench_arrays, bench_entity);
criterion_main!(benches);
