// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn mandel() -> Command {
    Command::cargo_bin("mandel").unwrap()
}

#[test]
fn renders_a_png() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "60x40", "-i", "50", "-t", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saving"));
    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn renders_a_zoomed_bmp() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zoomed.bmp");
    mandel()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "30x20",
            "-z",
            "4",
            "-c",
            "-0.75,0.1",
            "--start-color",
            "255,255,255",
            "--end-color",
            "0,0,0",
        ])
        .assert()
        .success();
    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[0..2], b"BM");
}

#[test]
fn rejects_unknown_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.gif");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("image format"));
    assert!(!out.exists());
}

#[test]
fn strict_partitioning_rejects_uneven_grids() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "3x2", "-t", "4", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
    assert!(!out.exists());

    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "3x2", "-t", "4"])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.png");
    fs::write(&out, b"keep me").unwrap();
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read(&out).unwrap(), b"keep me");

    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "--force"])
        .assert()
        .success();
    assert_ne!(fs::read(&out).unwrap(), b"keep me");
}

#[test]
fn rejects_bad_arguments() {
    mandel()
        .args(&["-o", "x.png", "-s", "big"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
    mandel()
        .args(&["-o", "x.png", "-z", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Zoom must be a positive number"));
}

#[cfg(not(feature = "opencl"))]
#[test]
fn unavailable_gpu_falls_back_to_cpu() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "40x20", "-b", "gpu"])
        .assert()
        .success()
        .stderr(predicate::str::contains("backend unavailable"))
        .stderr(predicate::str::contains("Backend            : cpu"))
        .stderr(predicate::str::contains("100% complete"));
    assert!(out.exists());
}
