use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use txb_codec::{
    error::Error, read::decode, text::render, BorderSet, Container, DecodeOptions, Dictionary,
    EntryName, RawBorder, SuffixResolver, Version,
};
use tracing::info;
use tracing_test::traced_test;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("resources").join(name)
}

fn dictionary() -> Result<Dictionary, Error> {
    let file = File::open(resource("names.txt"))?;
    Ok(Dictionary::from_reader(BufReader::new(file))?)
}

fn demo(options: DecodeOptions) -> Result<Container, Error> {
    decode(&std::fs::read(resource("demo.txb"))?, options)
}

fn validate_txb(path: &Path, dictionary: &Dictionary) -> Result<(), Error> {
    info!("testing {}", path.display());

    let txb = Container::read(File::open(path)?, DecodeOptions::default())?;
    let expected = std::fs::read_to_string(path.with_extension("txt"))?;

    assert_eq!(render(&txb, dictionary), expected);

    Ok(())
}

#[traced_test]
#[test]
fn validate_txb_parsing() -> Result<(), Error> {
    let dictionary = dictionary()?;
    let to_test = std::fs::read_dir(resource(""))?
        // Filter out all those directory entries which couldn't be read
        .filter_map(|res| res.ok())
        // Map the directory entries to paths
        .map(|dir_entry| dir_entry.path())
        .filter(|e| e.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txb"));

    for path in to_test {
        validate_txb(&path, &dictionary)?;
    }

    Ok(())
}

#[test]
fn decode_demo() -> Result<(), Error> {
    let txb = demo(DecodeOptions::default())?;

    assert_eq!(txb.version, Version([0x05, 0x00, 0x00, 0x00]));
    assert_eq!(txb.len(), 7);

    let entry = txb
        .by_hash(txb_codec::fnv1a_32("ep01_txt_01"))
        .expect("demo contains ep01_txt_01");
    assert_eq!(entry.record.text, "Press A\nto start");
    assert_eq!(entry.record.borders.len(), 2);
    assert_eq!(entry.record.borders.spans()[1].reserved, [0x10, 0x00]);

    assert_eq!(txb.entries[2].record.text, "ぼくの なまえ");
    assert_eq!(txb.entries[6].record.text, "");

    Ok(())
}

#[test]
fn force_borders_keeps_flag() -> Result<(), Error> {
    let txb = demo(DecodeOptions::builder().force_borders(true).build())?;

    assert_eq!(
        txb.entries[4].record.borders,
        BorderSet::Flag(RawBorder {
            start: 1,
            end: 3,
            color: 9,
            font: 2,
            reserved: [0x01, 0x02],
        })
    );

    // entries with more than one border are unaffected
    assert_eq!(txb.entries[3].record.borders.spans().len(), 2);

    Ok(())
}

#[test]
fn suffix_fallback_names_lettered_lines() -> Result<(), Error> {
    let dictionary = dictionary()?;
    let txb = demo(DecodeOptions::default())?;
    let hash = txb.entries[5].hash;

    assert_eq!(EntryName::resolve(hash, &dictionary), EntryName::Unknown(hash));
    assert_eq!(
        EntryName::resolve(hash, &SuffixResolver::new(&dictionary)),
        EntryName::Known("COMICDEMO_01a".into())
    );

    let rendered = render(&txb, &SuffixResolver::new(&dictionary));
    assert!(rendered.starts_with("[COMICDEMO_01a]\nb'00 00'\nBoom!\n[/t6]\n\n"));

    Ok(())
}

#[test]
fn records_out_of_table_order() -> Result<(), Error> {
    #[rustfmt::skip]
    let input = [
        0x74, 0x78, 0x62, 0x4C,
        0x02, 0x00, 0x00, 0x00,
        0x38, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00,
        // hashes
        0x2c, 0x29, 0x0c, 0xe4,
        0xab, 0x2c, 0x9f, 0x4f,
        // offsets
        0x0c, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        // second entry
        0x01, 0x00, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00,
        b'x', 0x00, 0x00, 0x00,
        // first entry
        0x02, 0x00, 0x02, 0x00,
        0x00, 0x00, 0x00, 0x00,
        b'h', b'i', 0x00, 0x00,
    ];

    let txb = decode(&input, DecodeOptions::default())?;

    assert_eq!(txb.hashes().collect::<Vec<_>>(), vec![0xe40c292c, 0x4f9f2cab]);
    assert_eq!(txb.entries[0].record.text, "hi");
    assert_eq!(txb.entries[1].record.text, "x");

    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn serialize_container() -> Result<(), Error> {
    let txb = demo(DecodeOptions::default())?;
    let json = serde_json::to_value(&txb).map_err(std::io::Error::from)?;

    assert_eq!(json["entries"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["entries"][0]["record"]["text"], "Galaxy Quest");
    assert_eq!(json["entries"][0]["hash"], 0x5b395f37);

    Ok(())
}
