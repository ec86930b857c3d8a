//! Compressor installer test using a locally built release archive.

#![cfg(unix)]

use std::fs::File;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, Header};

use vidshot::install::{BINARY_NAME, OXIPNG_VERSION};
use vidshot::{Installer, UninstallOutcome};

#[test]
fn install_from_archive_then_uninstall() {
    let scratch = tempfile::Builder::new()
        .prefix("vidshot-install")
        .tempdir_in(env!("CARGO_TARGET_TMPDIR"))
        .unwrap();

    let archive = scratch.path().join("oxipng.tar.gz");
    let script = format!("#!/bin/sh\necho oxipng {OXIPNG_VERSION}\n");
    {
        let mut builder = Builder::new(GzEncoder::new(File::create(&archive).unwrap(), Compression::default()));
        let mut header = Header::new_gnu();
        header.set_size(script.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("oxipng-{OXIPNG_VERSION}-x86_64-unknown-linux-musl/{BINARY_NAME}"),
                script.as_bytes(),
            )
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    let installer = Installer::new(scratch.path().join("bin"));
    let version = installer.install_from_archive(&archive).expect("install failed");

    assert_eq!(version, format!("oxipng {OXIPNG_VERSION}"));
    assert!(installer.binary_path().is_file());

    assert_eq!(installer.uninstall().unwrap(), UninstallOutcome::Removed(installer.binary_path()));
    assert_eq!(installer.uninstall().unwrap(), UninstallOutcome::NotInstalled(installer.binary_path()));

    let empty = scratch.path().join("empty.tar.gz");
    Builder::new(GzEncoder::new(File::create(&empty).unwrap(), Compression::default()))
        .into_inner()
        .unwrap()
        .finish()
        .unwrap();
    let error = installer.install_from_archive(&empty).unwrap_err();
    assert!(error.to_string().contains("no oxipng executable"));
}
