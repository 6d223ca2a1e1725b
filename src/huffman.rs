//! Static Huffman container format
//!
//! A compressed file has two parts:
//! * the frequency table as one line of compact JSON, terminated by `\n`
//! * the packed code bits, see `tools::bit_packer`
//!
//! The tree is not stored.  The expander rebuilds it from the frequency table,
//! tie-breaking is fixed so both sides always arrive at the same codes.
//!
//! Files are read entirely into memory.  Outputs are produced in memory and only
//! written once the transformation succeeded, so a failure never leaves a new file.

use std::io::{Cursor,Read,Write,BufRead,BufReader};
use std::path::{Path,PathBuf};
use crate::tools::frequency::FrequencyTable;
use crate::tools::codebook::Codebook;
use crate::tools::bit_packer;
use crate::Error;

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// extension of compressed files when the path is derived
    pub compressed_ext: &'static str,
    /// added to the file stem of expanded files when the path is derived
    pub expanded_suffix: &'static str,
    /// extension of expanded files when the path is derived
    pub expanded_ext: &'static str,
    /// Remove trailing whitespace before encoding.  This loses the trailing whitespace
    /// for good, but is how older files were made.
    pub trim_trailing: bool
}

pub const STD_OPTIONS: Options = Options {
    compressed_ext: "bin",
    expanded_suffix: "_decompressed",
    expanded_ext: "txt",
    trim_trailing: false
};

/// Read the metadata line and build the code tables from it.
/// Returns the frequency table, the codebook, the bytes consumed, and whether the
/// delimiter was found.
fn read_header<R: BufRead>(reader: &mut R) -> Result<(FrequencyTable,Codebook,u64,bool),Error> {
    let mut line: Vec<u8> = Vec::new();
    let count = reader.read_until(b'\n',&mut line)?;
    let delimited = line.last() == Some(&b'\n');
    if delimited {
        line.pop();
    }
    let freq = FrequencyTable::from_json(&line)?;
    log::debug!("metadata has {} symbols in {} bytes",freq.len(),count);
    let book = Codebook::from_frequencies(&freq)?;
    Ok((freq,book,count as u64,delimited))
}

/// Read only the metadata of a compressed file and return its codes
pub fn read_codebook<R: Read>(compressed_in: &mut R) -> Result<Codebook,Error> {
    let mut reader = BufReader::new(compressed_in);
    let (_,book,_,_) = read_header(&mut reader)?;
    Ok(book)
}

/// Main compression function, returns (in_size,out_size)
pub fn compress<R,W>(expanded_in: &mut R,compressed_out: &mut W,opt: &Options) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let mut text = String::new();
    let in_size = expanded_in.read_to_string(&mut text)? as u64;
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return Err(Error::EmptyInput);
    }
    let doc = match opt.trim_trailing {
        true => {
            if trimmed.len() < text.len() {
                log::warn!("dropping {} bytes of trailing whitespace",text.len()-trimmed.len());
            }
            trimmed
        },
        false => text.as_str()
    };
    let freq = FrequencyTable::compute(doc)?;
    let book = Codebook::from_frequencies(&freq)?;
    for (c,code) in book.list_codes() {
        log::trace!("{:?} ({}) = {}",c,freq.get(c).unwrap_or(0),code);
    }
    let bits = book.encode(doc)?;
    let packed = bit_packer::pack(&bits);
    let header = freq.to_json()?;
    log::debug!("{} symbols, {} distinct, {} code bits",freq.total(),freq.len(),bits.len());
    compressed_out.write_all(header.as_bytes())?;
    compressed_out.write_all(b"\n")?;
    compressed_out.write_all(&packed)?;
    compressed_out.flush()?;
    Ok((in_size,(header.len() + 1 + packed.len()) as u64))
}

/// Main decompression function, returns (in_size,out_size)
pub fn expand<R,W>(compressed_in: &mut R,expanded_out: &mut W) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let mut reader = BufReader::new(compressed_in);
    let (freq,book,header_size,delimited) = read_header(&mut reader)?;
    if !delimited {
        return Err(Error::TruncatedStream);
    }
    let mut packed: Vec<u8> = Vec::new();
    reader.read_to_end(&mut packed)?;
    let bits = bit_packer::unpack(&packed)?;
    log::debug!("{} packed bytes hold {} code bits",packed.len(),bits.len());
    let text = book.decode(bits.iter())?;
    let actual = text.chars().count() as u64;
    if actual != freq.total() {
        return Err(Error::LengthMismatch { expected: freq.total(), actual });
    }
    expanded_out.write_all(text.as_bytes())?;
    expanded_out.flush()?;
    Ok((header_size + packed.len() as u64,text.len() as u64))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8]) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans)?;
    Ok(ans.into_inner())
}

/// `dir/name.txt` becomes `dir/name.bin`
pub fn compressed_path(path_in: &Path,opt: &Options) -> PathBuf {
    path_in.with_extension(opt.compressed_ext)
}

/// `dir/name.bin` becomes `dir/name_decompressed.txt`
pub fn expanded_path(path_in: &Path,opt: &Options) -> PathBuf {
    let mut name = path_in.file_stem().unwrap_or_default().to_os_string();
    name.push(opt.expanded_suffix);
    name.push(".");
    name.push(opt.expanded_ext);
    path_in.with_file_name(name)
}

/// Refuse an output that would overwrite the input it is made from
fn check_distinct(path_in: &Path,path_out: &Path) -> Result<(),Error> {
    let same = match (std::fs::canonicalize(path_in),std::fs::canonicalize(path_out)) {
        (Ok(p1),Ok(p2)) => p1 == p2,
        _ => path_in == path_out
    };
    match same {
        true => Err(Error::OutputIsInput(path_out.to_path_buf())),
        false => Ok(())
    }
}

/// Compress the file at `path_in` into `path_out`, returns (in_size,out_size)
pub fn compress_file_to(path_in: &Path,path_out: &Path,opt: &Options) -> Result<(u64,u64),Error> {
    check_distinct(path_in,path_out)?;
    let dat = std::fs::read(path_in)?;
    let compressed = compress_slice(&dat,opt)?;
    std::fs::write(path_out,&compressed)?;
    log::debug!("wrote {}",path_out.display());
    Ok((dat.len() as u64,compressed.len() as u64))
}

/// Expand the file at `path_in` into `path_out`, returns (in_size,out_size)
pub fn expand_file_to(path_in: &Path,path_out: &Path) -> Result<(u64,u64),Error> {
    check_distinct(path_in,path_out)?;
    let dat = std::fs::read(path_in)?;
    let expanded = expand_slice(&dat)?;
    std::fs::write(path_out,&expanded)?;
    log::debug!("wrote {}",path_out.display());
    Ok((dat.len() as u64,expanded.len() as u64))
}

/// Compress next to the input, returns the path of the compressed file
pub fn compress_file(path_in: &Path,opt: &Options) -> Result<PathBuf,Error> {
    let path_out = compressed_path(path_in,opt);
    compress_file_to(path_in,&path_out,opt)?;
    Ok(path_out)
}

/// Expand next to the input, returns the path of the expanded file
pub fn expand_file(path_in: &Path,opt: &Options) -> Result<PathBuf,Error> {
    let path_out = expanded_path(path_in,opt);
    expand_file_to(path_in,&path_out)?;
    Ok(path_out)
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    let compressed = compress_slice(b"abracadabra",&STD_OPTIONS).expect("compression failed");
    let expected = [
        r#"{"a":5,"b":2,"c":1,"d":1,"r":2}"#.as_bytes().to_vec(),
        hex::decode("0A016E8ADC").unwrap()
    ].concat();
    assert_eq!(compressed,expected);
}

#[test]
fn single_symbol() {
    let compressed = compress_slice(b"aaaa",&STD_OPTIONS).expect("compression failed");
    let expected = [
        r#"{"a":4}"#.as_bytes().to_vec(),
        hex::decode("0A0400").unwrap()
    ].concat();
    assert_eq!(compressed,expected);
    let book = read_codebook(&mut Cursor::new(&compressed)).expect("bad metadata");
    assert_eq!(book.list_codes(),vec![('a',"0".to_string())]);
    assert_eq!(expand_slice(&compressed).expect("expansion failed"),b"aaaa");
}

#[test]
fn invertibility() {
    let samples: [&str;5] = [
        "I am Sam. Sam I am. I do not like this Sam I am.\n",
        "ab",
        "\n\n  x\t\r\n",
        "Grüße, мир! 你好 🌍🌍",
        "{\"quoted\": \"json\\n\"}\n"
    ];
    for test_data in samples {
        let compressed = compress_slice(test_data.as_bytes(),&STD_OPTIONS).expect("compression failed");
        let expanded = expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data.as_bytes().to_vec(),expanded);
    }
}

#[test]
fn invertibility_sweep() {
    // alphabets of 1 to 64 symbols; the first 20 weights follow the Fibonacci sequence
    // for the deepest possible trees, the rest repeat small counts to force ties
    let mut fib: Vec<usize> = vec![1,1];
    while fib.len() < 20 {
        fib.push(fib[fib.len()-1] + fib[fib.len()-2]);
    }
    for size in 1..=64_u32 {
        let mut test_data = String::new();
        for i in 0..size {
            let c = char::from_u32(0x21 + i).expect("bad symbol");
            let count = match (i as usize) < fib.len() {
                true => fib[i as usize],
                false => (i as usize) % 3 + 1
            };
            for _ in 0..count {
                test_data.push(c);
            }
        }
        // interleave so the document is not sorted by symbol
        let rotated: String = test_data.chars().rev().step_by(2).chain(test_data.chars().step_by(2)).collect();
        for doc in [&test_data,&rotated] {
            let compressed = compress_slice(doc.as_bytes(),&STD_OPTIONS).expect("compression failed");
            assert_eq!(compress_slice(doc.as_bytes(),&STD_OPTIONS).expect("compression failed"),compressed);
            let expanded = expand_slice(&compressed).expect("expansion failed");
            assert_eq!(doc.as_bytes().to_vec(),expanded,"alphabet size {}",size);
        }
    }
}

#[test]
fn deterministic() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let first = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let second = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(first,second);
}

#[test]
fn trim_option() {
    let mut opt = STD_OPTIONS;
    opt.trim_trailing = true;
    let compressed = compress_slice(b"aaaa \n\n",&opt).expect("compression failed");
    assert_eq!(expand_slice(&compressed).expect("expansion failed"),b"aaaa");
    let compressed = compress_slice(b"aaaa \n\n",&STD_OPTIONS).expect("compression failed");
    assert_eq!(expand_slice(&compressed).expect("expansion failed"),b"aaaa \n\n");
}

#[test]
fn empty_input() {
    assert!(matches!(compress_slice(b"",&STD_OPTIONS),Err(Error::EmptyInput)));
    assert!(matches!(compress_slice(b" \n\t\n",&STD_OPTIONS),Err(Error::EmptyInput)));
}

#[test]
fn not_utf8() {
    match compress_slice(&[0x61,0xff,0x62],&STD_OPTIONS) {
        Err(Error::Io(e)) => assert_eq!(e.kind(),std::io::ErrorKind::InvalidData),
        _ => panic!("invalid UTF-8 was accepted")
    }
}

#[test]
fn corrupted_streams() {
    // codes are c=0, a=10, b=11; seven c's then a dangling 1
    let dangling = [r#"{"a":1,"b":1,"c":2}"#.as_bytes(),&b"\n\x00\x01"[..]].concat();
    assert!(matches!(expand_slice(&dangling),Err(Error::UndecodableStream)));
    // decodes cleanly as a,b,c,c,c,c but the table promises 4 symbols
    let too_many = [r#"{"a":1,"b":1,"c":2}"#.as_bytes(),&b"\n\x00\xb0"[..]].concat();
    assert!(matches!(expand_slice(&too_many),Err(Error::LengthMismatch { expected: 4, actual: 6 })));
    assert!(matches!(expand_slice(br#"{"a":1}"#),Err(Error::TruncatedStream)));
    assert!(matches!(expand_slice(b"{\"a\":1}\n"),Err(Error::TruncatedStream)));
    assert!(matches!(expand_slice(b"not json\n\x00\x00"),Err(Error::MetadataParse(_))));
    assert!(matches!(expand_slice(b"{}\n\x00\x00"),Err(Error::EmptyAlphabet)));
    let bad_pad = [r#"{"a":1}"#.as_bytes(),&b"\n\x0c\x00"[..]].concat();
    assert!(matches!(expand_slice(&bad_pad),Err(Error::BadPadding(12))));
}

#[test]
fn foreign_payload_fails_fast() {
    // the lone code is `0`, so a payload of ones is rejected at its first bit
    let test_data = [b"{\"a\":1}\n\x00".to_vec(),vec![0xff;1 << 20]].concat();
    let start = std::time::Instant::now();
    assert!(matches!(expand_slice(&test_data),Err(Error::UndecodableStream)));
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn derived_paths() {
    let p = Path::new("dir").join("notes.txt");
    assert_eq!(compressed_path(&p,&STD_OPTIONS),Path::new("dir").join("notes.bin"));
    let p = Path::new("dir").join("notes.bin");
    assert_eq!(expanded_path(&p,&STD_OPTIONS),Path::new("dir").join("notes_decompressed.txt"));
    let p = Path::new("dir").join("notes.v2.bin");
    assert_eq!(expanded_path(&p,&STD_OPTIONS),Path::new("dir").join("notes.v2_decompressed.txt"));
}

#[test]
fn file_round_trip() {
    let temp_dir = tempfile::tempdir().expect("no temp dir");
    let path_in = temp_dir.path().join("sam.txt");
    std::fs::write(&path_in,"I am Sam. Sam I am.\n").unwrap();
    let path_cmp = compress_file(&path_in,&STD_OPTIONS).expect("compression failed");
    assert_eq!(path_cmp,temp_dir.path().join("sam.bin"));
    let path_exp = expand_file(&path_cmp,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(path_exp,temp_dir.path().join("sam_decompressed.txt"));
    assert_eq!(std::fs::read(path_exp).unwrap(),b"I am Sam. Sam I am.\n");
}

#[test]
fn output_may_not_replace_input() {
    let temp_dir = tempfile::tempdir().expect("no temp dir");
    let path_in = temp_dir.path().join("notes.bin");
    std::fs::write(&path_in,"abracadabra").unwrap();
    assert!(matches!(compress_file(&path_in,&STD_OPTIONS),Err(Error::OutputIsInput(_))));
    assert_eq!(std::fs::read(&path_in).unwrap(),b"abracadabra");
    let compressed = temp_dir.path().join("notes.huf");
    compress_file_to(&path_in,&compressed,&STD_OPTIONS).expect("compression failed");
    let alias = temp_dir.path().join(".").join("notes.huf");
    assert!(matches!(expand_file_to(&compressed,&alias),Err(Error::OutputIsInput(_))));
    expand_file_to(&compressed,&path_in).expect("expansion failed");
    assert_eq!(std::fs::read(&path_in).unwrap(),b"abracadabra");
}

#[test]
fn empty_file_leaves_nothing() {
    let temp_dir = tempfile::tempdir().expect("no temp dir");
    let path_in = temp_dir.path().join("empty.txt");
    std::fs::write(&path_in,"\n").unwrap();
    assert!(matches!(compress_file(&path_in,&STD_OPTIONS),Err(Error::EmptyInput)));
    assert!(!temp_dir.path().join("empty.bin").exists());
}
