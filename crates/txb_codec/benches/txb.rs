use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn synthetic(entries: usize) -> txb_codec::Container {
    use txb_codec::{Border, BorderSet, Container, Entry, EntryRecord, Flags, Version};

    Container {
        version: Version::default(),
        entries: (0..entries)
            .map(|i| Entry {
                hash: txb_codec::fnv1a_32(&format!("line_{i:05}")),
                record: EntryRecord {
                    flags: Flags([0x00, (i % 4) as u8]),
                    text: format!("Line {i} of the script\nwith a highlighted word"),
                    borders: BorderSet::Spans(vec![
                        Border::new(0, 3, 1, 0, [0, 0]),
                        Border::new(37, 47, (i % 16) as u8, 1, [0, 0]),
                    ]),
                },
            })
            .collect(),
    }
}

pub mod read {
    use divan::Bencher;
    use txb_codec::{decode, encode, DecodeOptions};

    #[divan::bench(args = [100, 10_000])]
    fn decode_container(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| encode(&super::synthetic(entries)).unwrap())
            .bench_refs(|data| {
                divan::black_box(decode(data, DecodeOptions::default()).unwrap());
            });
    }
}

pub mod write {
    use divan::Bencher;
    use txb_codec::encode;

    #[divan::bench(args = [100, 10_000])]
    fn encode_container(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| super::synthetic(entries))
            .bench_refs(|txb| {
                divan::black_box(encode(txb).unwrap());
            });
    }
}

pub mod text {
    use divan::Bencher;
    use txb_codec::{pack, render, NoNames, PackOptions};

    #[divan::bench(args = [100, 10_000])]
    fn render_container(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| super::synthetic(entries))
            .bench_refs(|txb| {
                divan::black_box(render(txb, &NoNames));
            });
    }

    #[divan::bench(args = [100, 10_000])]
    fn pack_document(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| render(&super::synthetic(entries), &NoNames))
            .bench_refs(|document| {
                divan::black_box(pack(document, None, &PackOptions::default()));
            });
    }
}
