use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{info, instrument};
use tracing_test::traced_test;
use txb_codec::{
    read::decode, write::encode, Border, BorderSet, Container, DecodeOptions, Entry, EntryRecord,
    Flags, Version,
};

#[instrument(skip_all, fields(file = %path.display()))]
fn validate_txb_rewrite(path: &Path, options: DecodeOptions) -> Result<()> {
    let mut expected = Vec::new();
    File::open(path)
        .into_diagnostic()?
        .read_to_end(&mut expected)
        .into_diagnostic()?;

    let txb = decode(&expected, options)?;
    info!("rewriting {} entries", txb.len());

    let mut actual = Vec::new();
    txb.write(&mut actual)?;

    assert_eq!(expected.len(), actual.len());
    assert_eq!(expected, actual);

    let reread = Container::read(Cursor::new(actual), options)?;
    assert_eq!(txb, reread);

    Ok(())
}

#[traced_test]
#[test]
fn rewrite_txb() -> Result<()> {
    let to_test = std::fs::read_dir(format!("{}/resources/", env!("CARGO_MANIFEST_DIR")))
        .into_diagnostic()?
        // Filter out all those directory entries which couldn't be read
        .filter_map(|res| res.ok())
        // Map the directory entries to paths
        .map(|dir_entry| dir_entry.path())
        .filter(|e| e.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txb"));

    for path in to_test {
        validate_txb_rewrite(&path, DecodeOptions::default())?;
        validate_txb_rewrite(&path, DecodeOptions::builder().force_borders(true).build())?;
    }

    Ok(())
}

#[test]
fn rewrite_normalizes_line_breaks() -> Result<()> {
    let txb = Container {
        version: Version::default(),
        entries: vec![Entry {
            hash: txb_codec::fnv1a_32("greeting"),
            record: EntryRecord {
                flags: Flags([0x00, 0x01]),
                text: "one\r\ntwo".into(),
                borders: BorderSet::Spans(vec![Border::new(5, 7, 1, 1, [0, 0])]),
            },
        }],
    };

    let decoded = decode(&encode(&txb)?, DecodeOptions::default())?;

    // the stored payload keeps its CRLF, the decoded text does not
    assert_eq!(decoded.entries[0].record.text, "one\ntwo");
    assert_eq!(decoded.entries[0].record.borders, txb.entries[0].record.borders);

    let reencoded = encode(&decoded)?;
    assert_eq!(reencoded.len(), encode(&txb)?.len() - 4);

    Ok(())
}
