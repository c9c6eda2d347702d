use anyhow::Result;
use gzsum_core::{archive, sidecar_path, unarchive, ArchiveOptions, ArchiveOutcome, Archiver, GzipOptions};
use sha2::Sha256;
use std::fs;
use tempfile::TempDir;

const TEST_CONTENT: &[u8] = b"test content";
const TEST_CONTENT_MD5: &str = "9473fdd0d880a43c21b7778d34872157";

#[test]
fn test_archive_then_skip_on_identical_source() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("in.json");
    let dest = dir.path().join("out");
    fs::write(&source, TEST_CONTENT)?;

    let first = archive(&source, &dest)?;
    assert!(!first.is_skipped(), "first pass on fresh files must compress");
    assert_eq!(fs::read_to_string(dir.path().join("out.md5"))?, TEST_CONTENT_MD5);
    assert!(!source.exists(), "source file should not exist anymore");

    let artifact = fs::read(&dest)?;

    // recreate the input with identical bytes
    fs::write(&source, TEST_CONTENT)?;
    let second = archive(&source, &dest)?;
    assert!(second.is_skipped());
    assert_eq!(second.digest(), TEST_CONTENT_MD5);
    assert_eq!(fs::read(&dest)?, artifact, "skipped run must not rewrite the artifact");
    assert!(source.exists(), "skipped run leaves the source alone");

    Ok(())
}

#[test]
fn test_decompression_restores_content() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("in.json");
    let dest = dir.path().join("out.gz");
    let restored = dir.path().join("restored.json");
    fs::write(&source, TEST_CONTENT)?;

    archive(&source, &dest)?;
    let written = unarchive(&dest, &restored)?;

    assert_eq!(written, TEST_CONTENT.len() as u64);
    assert_eq!(fs::read(&restored)?, TEST_CONTENT);
    Ok(())
}

#[test]
fn test_changed_source_is_recompressed() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("in.json");
    let dest = dir.path().join("out.gz");
    let restored = dir.path().join("restored.json");

    fs::write(&source, TEST_CONTENT)?;
    archive(&source, &dest)?;

    fs::write(&source, b"other content")?;
    let outcome = archive(&source, &dest)?;
    assert!(!outcome.is_skipped());
    assert_eq!(outcome.digest(), "0c84751f0ca9c6886bb09f2dd1a66faa");
    assert_eq!(fs::read_to_string(sidecar_path(&dest))?, "0c84751f0ca9c6886bb09f2dd1a66faa");

    unarchive(&dest, &restored)?;
    assert_eq!(fs::read(&restored)?, b"other content");
    Ok(())
}

#[test]
fn test_roundtrip_assorted_payloads() -> Result<()> {
    let dir = TempDir::new()?;
    let archiver = Archiver::new(ArchiveOptions {
        gzip: GzipOptions {
            level: 9,
            buffer_size: 4096,
            ..GzipOptions::default()
        },
    });

    // larger than every internal buffer, and not very compressible
    let mut noisy = Vec::with_capacity(300_000);
    let mut x: u32 = 0x2545_f491;
    for _ in 0..300_000 {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        noisy.push(x as u8);
    }

    let payloads: Vec<Vec<u8>> = vec![Vec::new(), vec![0u8], (0..=255u8).collect(), noisy];

    for (i, payload) in payloads.iter().enumerate() {
        let source = dir.path().join(format!("in-{i}"));
        let dest = dir.path().join(format!("out-{i}.gz"));
        let restored = dir.path().join(format!("restored-{i}"));
        fs::write(&source, payload)?;

        let outcome = archiver.archive(&source, &dest)?;
        assert!(!outcome.is_skipped());
        archiver.unarchive(&dest, &restored)?;

        assert_eq!(&fs::read(&restored)?, payload, "payload {i} did not survive");
    }
    Ok(())
}

#[test]
fn test_outcome_digest_matches_sidecar() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("data.bin");
    let dest = dir.path().join("data.bin.gz");
    fs::write(&source, b"\x00\x01binary\xff")?;

    let outcome = archive(&source, &dest)?;
    let stored = fs::read_to_string(dir.path().join("data.bin.gz.md5"))?;
    assert_eq!(outcome.digest(), stored);
    assert_eq!(stored.len(), 32);
    assert!(stored.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    Ok(())
}

#[test]
fn test_unarchive_rejects_corrupt_stream() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("in.json");
    let dest = dir.path().join("out.gz");
    let restored = dir.path().join("restored.json");
    fs::write(&source, vec![b'z'; 50_000])?;
    archive(&source, &dest)?;

    let mut bytes = fs::read(&dest)?;
    let crc_at = bytes.len() - 8;
    bytes[crc_at] ^= 0xff;
    fs::write(&dest, &bytes)?;

    let err = unarchive(&dest, &restored).unwrap_err();
    assert!(err.is_format(), "unexpected error: {err}");
    assert_eq!(err.path(), dest.as_path());
    Ok(())
}

#[test]
fn test_unarchive_missing_input_is_io_fault() -> Result<()> {
    let dir = TempDir::new()?;
    let err = unarchive(dir.path().join("nope.gz"), dir.path().join("out")).unwrap_err();
    assert!(!err.is_format());
    assert_eq!(err.stage(), Some(gzsum_core::Stage::OpenSource));
    Ok(())
}

#[test]
fn test_any_fixed_size_digest_works() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("in.json");
    let dest = dir.path().join("out.gz");
    fs::write(&source, TEST_CONTENT)?;

    let archiver = Archiver::default();
    let outcome = archiver.archive_with::<Sha256>(&source, &dest, "sha256")?;
    assert_eq!(
        fs::read_to_string(dir.path().join("out.gz.sha256"))?,
        "6ae8a75555209fd6c44157c0aed8016e763ff435a19cf186f76863140143ff72"
    );
    assert!(matches!(outcome, ArchiveOutcome::Compressed { .. }));
    assert!(!dir.path().join("out.gz.md5").exists());

    fs::write(&source, TEST_CONTENT)?;
    assert!(archiver.archive_with::<Sha256>(&source, &dest, "sha256")?.is_skipped());
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_undeletable_source_is_cleanup_fault_without_rollback() -> Result<()> {
    // procfs files can be read but never unlinked, even by root
    let source = std::path::Path::new("/proc/self/cmdline");
    let dir = TempDir::new()?;
    let dest = dir.path().join("out.gz");

    let err = archive(source, &dest).unwrap_err();
    match &err {
        gzsum_core::ArchiveError::Cleanup { path, .. } => assert_eq!(path.as_path(), source),
        other => panic!("expected cleanup fault, got {other:?}"),
    }
    assert!(!err.is_format());
    assert_eq!(err.stage(), None);

    // artifact and sidecar were already written and stay in place
    let compressed = fs::read(&dest)?;
    assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    let stored = fs::read_to_string(dir.path().join("out.gz.md5"))?;
    assert_eq!(stored.len(), 32);
    assert_eq!(unarchive(&dest, dir.path().join("cmdline"))?, fs::read(source)?.len() as u64);
    Ok(())
}
