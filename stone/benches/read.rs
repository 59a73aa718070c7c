// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use criterion::{Criterion, criterion_group, criterion_main};
use xxhash_rust::xxh3::xxh3_64;

/// Builds a minimal archive in memory: one ATTRIBUTES payload followed by
/// one zstd-compressed CONTENT payload, mirroring a small real package.
fn fixture() -> Vec<u8> {
    let attribute = {
        let mut buf = Vec::new();
        buf.extend_from_slice(&4u64.to_be_bytes());
        buf.extend_from_slice(&6u64.to_be_bytes());
        buf.extend_from_slice(b"arch");
        buf.extend_from_slice(b"x86_64");
        buf
    };
    let attribute_checksum = xxh3_64(&attribute);

    let content = vec![0x42u8; 256 * 1024];
    let stored = zstd::stream::encode_all(content.as_slice(), 3).unwrap();
    let content_checksum = xxh3_64(&content);

    let mut archive = vec![0u8; 32];
    archive[0..4].copy_from_slice(&[0x00, b'm', b'o', b's']);
    archive[4..8].copy_from_slice(&1u32.to_be_bytes());
    archive[8..10].copy_from_slice(&2u16.to_be_bytes());
    archive[10] = 1; // Binary

    let mut payload_header = |stored_size: u64, plain_size: u64, checksum: u64, num_records: u32, kind: u8| {
        let mut buf = Vec::new();
        buf.extend_from_slice(&stored_size.to_be_bytes());
        buf.extend_from_slice(&plain_size.to_be_bytes());
        buf.extend_from_slice(&checksum.to_be_bytes());
        buf.extend_from_slice(&num_records.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.push(kind);
        buf.push(if kind == 2 { 2 } else { 1 });
        buf
    };

    archive.extend_from_slice(&payload_header(
        attribute.len() as u64,
        attribute.len() as u64,
        attribute_checksum,
        1,
        5,
    ));
    archive.extend_from_slice(&attribute);

    archive.extend_from_slice(&payload_header(
        stored.len() as u64,
        content.len() as u64,
        content_checksum,
        0,
        2,
    ));
    archive.extend_from_slice(&stored);

    archive
}

fn bench_read_archive(c: &mut Criterion) {
    let archive = fixture();

    c.bench_function("read_and_extract_content", |b| {
        b.iter(|| {
            let (mut reader, _version) = stone::read_buffer(archive.clone()).unwrap();

            while let Some(mut payload) = reader.next_payload().unwrap() {
                match payload.header().kind {
                    stone::payload::Kind::Attributes => {
                        let _records = payload.iter_attribute().unwrap();
                    }
                    stone::payload::Kind::Content => {
                        let _bytes = payload.unpack_content_to_buf().unwrap();
                    }
                    _ => {}
                }
            }
        })
    });
}

criterion_group!(benches, bench_read_archive);
criterion_main!(benches);
