use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::{PathBuf,Path};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

// Copy a text fixture into the temporary directory with every LF or CRLF replaced by `tok`,
// so that newline conversion by git does not change what is compressed.
fn copy_and_fix_newlines(in_file: PathBuf,temp_dir: &tempfile::TempDir,tok: &[u8]) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let txt = std::fs::read(in_file)?;
    let new_txt: Vec<u8> = txt.split(|b| *b==10)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect::<Vec<&[u8]>>()
        .join(tok);
    let new_txt_path = temp_dir.path().join("converted.txt");
    std::fs::write(&new_txt_path,new_txt)?;
    Ok(new_txt_path)
}

#[test]
fn newline_conversion() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("crlf.txt");
    std::fs::write(&src,b"one\r\ntwo\nthree\r\n")?;
    let fixed = copy_and_fix_newlines(src,&temp_dir,&[10])?;
    assert_eq!(std::fs::read(fixed)?,b"one\ntwo\nthree\n");
    Ok(())
}

fn compress_test(base_name: &str,xext: &str,cext: &str) -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcoder")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path_any_newline = Path::new("tests").join([base_name,".",xext].concat());
    let in_path = copy_and_fix_newlines(in_path_any_newline,&temp_dir,&[10])?;
    let cmp_path = Path::new("tests").join([base_name,".",cext].concat());
    let out_path = temp_dir.path().join([base_name,".",cext].concat());
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));
    match (std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

fn expand_test(base_name: &str,xext: &str,cext: &str) -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcoder")?;
    let temp_dir = tempfile::tempdir()?;
    let in_path = Path::new("tests").join([base_name,".",cext].concat());
    let cmp_path_any_newline = Path::new("tests").join([base_name,".",xext].concat());
    let cmp_path = copy_and_fix_newlines(cmp_path_any_newline,&temp_dir,&[10])?;
    let out_path = temp_dir.path().join([base_name,".",xext].concat());
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("expanded"));
    match (std::fs::read(cmp_path),std::fs::read(out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn huffman_compression() -> STDRESULT {
    compress_test("sam_i_am","txt","bin")
}

#[test]
fn huffman_expansion() -> STDRESULT {
    expand_test("sam_i_am","txt","bin")
}

#[test]
fn derived_output_paths() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("notes.txt");
    std::fs::write(&in_path,"aaaa")?;
    Command::cargo_bin("huffcoder")?
        .arg("compress").arg("-i").arg(&in_path)
        .assert()
        .success();
    let cmp_path = temp_dir.path().join("notes.bin");
    assert_eq!(std::fs::read(&cmp_path)?,hex::decode("7b2261223a347d0a0400")?);
    Command::cargo_bin("huffcoder")?
        .arg("expand").arg("-i").arg(&cmp_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(temp_dir.path().join("notes_decompressed.txt"))?,b"aaaa");
    Ok(())
}

#[test]
fn list_codes() -> STDRESULT {
    let in_path = Path::new("tests").join("sam_i_am.bin");
    Command::cargo_bin("huffcoder")?
        .arg("codes").arg("-i").arg(&in_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("'\\n' = 10101"))
        .stdout(predicate::str::contains("' ' = 01"))
        .stdout(predicate::str::contains("'!' = 101000"))
        .stdout(predicate::str::contains("'a' = 1111"));
    Ok(())
}

#[test]
fn empty_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("blank.txt");
    std::fs::write(&in_path," \n\n")?;
    Command::cargo_bin("huffcoder")?
        .arg("compress").arg("-i").arg(&in_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyInput"));
    assert!(!temp_dir.path().join("blank.bin").exists());
    Ok(())
}

#[test]
fn corrupted_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("bad.bin");
    // codes are c=0, a=10, b=11, stream ends on a dangling 1
    std::fs::write(&in_path,[r#"{"a":1,"b":1,"c":2}"#.as_bytes(),&b"\n\x00\x01"[..]].concat())?;
    let out_path = temp_dir.path().join("bad.txt");
    Command::cargo_bin("huffcoder")?
        .arg("expand").arg("-i").arg(&in_path).arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("UndecodableStream"));
    assert!(!out_path.exists());
    Ok(())
}
