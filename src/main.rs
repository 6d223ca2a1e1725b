use clap::{arg,crate_version,Command};
use std::path::{Path,PathBuf};
use huffcoder::huffman;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &Path) -> bool {
    if path_out.exists() {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out.display());
        if std::io::stdin().read_line(&mut ans).is_err() {
            return false;
        }
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("{} will be replaced",path_out.display());
            return true;
        }
        return false;
    }
    true
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `huffcoder compress -i notes.txt -o notes.bin`
Expand:        `huffcoder expand -i notes.bin -o notes.txt`
Show codes:    `huffcoder codes -i notes.bin`

If the output is omitted it is put next to the input,
`notes.txt` compresses to `notes.bin`, which expands to `notes_decompressed.txt`.";

    let mut main_cmd = Command::new("huffcoder")
        .about("Compress and expand text with static Huffman codes")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path"))
        .arg(arg!(--trim "drop trailing whitespace before encoding"))
        .arg(arg!(--codes "print the code table after compressing"))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path"))
        .about("expand a file"));

    main_cmd = main_cmd.subcommand(Command::new("codes")
        .arg(arg!(-i --input <PATH> "compressed file").required(true))
        .about("print the code table of a compressed file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
        let mut opt = huffman::STD_OPTIONS;
        opt.trim_trailing = cmd.get_flag("trim");
        let path_out = match cmd.get_one::<String>("output") {
            Some(p) => PathBuf::from(p),
            None => huffman::compressed_path(&path_in,&opt)
        };
        if !ok_to_overwrite(&path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let (in_size,out_size) = huffman::compress_file_to(&path_in,&path_out,&opt)?;
        eprintln!("compressed {} into {}",in_size,out_size);
        if cmd.get_flag("codes") {
            let mut compressed = std::fs::File::open(&path_out)?;
            print_codes(&huffman::read_codebook(&mut compressed)?);
        }
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
        let path_out = match cmd.get_one::<String>("output") {
            Some(p) => PathBuf::from(p),
            None => huffman::expanded_path(&path_in,&huffman::STD_OPTIONS)
        };
        if !ok_to_overwrite(&path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let (in_size,out_size) = huffman::expand_file_to(&path_in,&path_out)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("codes") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let mut compressed = std::fs::File::open(path_in)?;
        print_codes(&huffman::read_codebook(&mut compressed)?);
    }

    Ok(())
}

fn print_codes(book: &huffcoder::Codebook) {
    for (c,code) in book.list_codes() {
        println!("{:?} = {}",c,code);
    }
}
