use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs
use tempfile;
mod common;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

#[test]
fn put_sys_to_new_file() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    let sys = dir.path().join("CPM.SYS");
    let out = dir.path().join("cpm_new.d88");
    let orig = common::standard_disk();
    std::fs::write(&src,&orig)?;
    std::fs::write(&sys,vec![0x3c;7000])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("put-sys")
        .arg("-d").arg(&src)
        .arg("-f").arg(&sys)
        .arg("-o").arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("group 29h: track 22, sectors 9-16"))
        .stderr(predicate::str::contains("group 2Ch: track 24, sectors 1-8"));
    // source is left alone
    assert_eq!(std::fs::read(&src)?,orig);
    let modified = std::fs::read(&out)?;
    assert_eq!(modified.len(),orig.len());
    // data of track 22 sector 9 is the first to change
    let first = 0x2b0 + 22*16*272 + 8*272;
    assert_eq!(modified[0..first+16],orig[0..first+16]);
    assert!(modified[first+16..first+272].iter().all(|b| *b==0x3c));
    Ok(())
}

#[test]
fn put_sys_in_place() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    let sys = dir.path().join("CPM.SYS");
    let orig = common::standard_disk();
    std::fs::write(&src,&orig)?;
    std::fs::write(&sys,vec![0x3c;100])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("put-sys")
        .arg("-d").arg(&src)
        .arg("-f").arg(&sys)
        .arg("--groups").arg("0")
        .assert()
        .success();
    let modified = std::fs::read(&src)?;
    let trk2 = 0x2b0 + 2*16*272;
    assert!(modified[trk2+16..trk2+116].iter().all(|b| *b==0x3c));
    assert!(modified[trk2+116..trk2+272].iter().all(|b| *b==0));
    Ok(())
}

#[test]
fn put_sys_too_large() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    let sys = dir.path().join("CPM.SYS");
    let out = dir.path().join("cpm_new.d88");
    std::fs::write(&src,common::standard_disk())?;
    std::fs::write(&sys,vec![0x3c;8193])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("put-sys")
        .arg("-d").arg(&src)
        .arg("-f").arg(&sys)
        .arg("-o").arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("8193 > 8192"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn put_sys_missing_file() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    std::fs::write(&src,common::standard_disk())?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("put-sys")
        .arg("-d").arg(&src)
        .arg("-f").arg(dir.path().join("nothing.sys"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn get_raw_to_file() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    let out = dir.path().join("cpm.raw");
    std::fs::write(&src,common::standard_disk())?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("get-raw")
        .arg("-d").arg(&src)
        .arg("-o").arg(&out)
        .assert()
        .success();
    let flat = std::fs::read(&out)?;
    assert_eq!(flat.len(),40*4096);
    assert_eq!(flat[23*4096+5],common::pattern(23,1,5));
    Ok(())
}

#[test]
fn stat_json() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("cpm.d88");
    std::fs::write(&src,common::standard_disk())?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("stat")
        .arg("-d").arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""_pretty":"CPM80""#));
    Ok(())
}

#[test]
fn stat_not_d88() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("tiny.d88");
    std::fs::write(&src,vec![0;100])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("stat")
        .arg("-d").arg(&src)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn patch_bios() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let sys = dir.path().join("CPM.SYS");
    let bios = dir.path().join("BIOS.BIN");
    let out = dir.path().join("CPM_NEW.SYS");
    std::fs::write(&sys,vec![0x21;0x2000])?;
    std::fs::write(&bios,vec![0xc3;300])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("patch-bios")
        .arg("-s").arg(&sys)
        .arg("-b").arg(&bios)
        .arg("-o").arg(&out)
        .assert()
        .success();
    let patched = std::fs::read(&out)?;
    assert_eq!(patched.len(),0x1600 + 384);
    assert!(patched[0..0x1600].iter().all(|b| *b==0x21));
    assert!(patched[0x1600..0x1600+300].iter().all(|b| *b==0xc3));
    assert!(patched[0x1600+300..].iter().all(|b| *b==0));
    Ok(())
}

#[test]
fn patch_bios_short_sys() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let sys = dir.path().join("CPM.SYS");
    let bios = dir.path().join("BIOS.BIN");
    let out = dir.path().join("CPM_NEW.SYS");
    std::fs::write(&sys,vec![0x21;0x1000])?;
    std::fs::write(&bios,vec![0xc3;300])?;
    let mut cmd = Command::cargo_bin("d88kit")?;
    cmd.arg("patch-bios")
        .arg("-s").arg(&sys)
        .arg("-b").arg(&bios)
        .arg("-o").arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
    Ok(())
}
