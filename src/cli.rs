//! Command-line interface for rs-managed-crypto
//!
//! Usage:
//!   crypto-cli hash <alg> <file>
//!   crypto-cli hmac <alg> <hex-key> <file>
//!   crypto-cli encrypt <alg> <mode> <padding> <hex-key> <hex-iv> <in> <out>
//!   crypto-cli decrypt <alg> <mode> <padding> <hex-key> <hex-iv> <in> <out>
//!   crypto-cli base64 <file>

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process;

use managed_crypto::{
    CryptoWriter, HashAlgorithm, HashKind, Hmac, Result, SymmetricAlgorithm, SymmetricKind,
    ToBase64Transform,
};

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  crypto-cli hash <alg> <file>                  - Print the digest of a file");
    eprintln!("  crypto-cli hmac <alg> <hex-key> <file>        - Print the HMAC of a file");
    eprintln!("  crypto-cli encrypt <alg> <mode> <padding> <hex-key> <hex-iv> <in> <out>");
    eprintln!("  crypto-cli decrypt <alg> <mode> <padding> <hex-key> <hex-iv> <in> <out>");
    eprintln!("  crypto-cli base64 <file>                      - Print a file as Base64");
    eprintln!();
    eprintln!("Hashes: MD5, SHA1, SHA256, SHA384, SHA512, RIPEMD160");
    eprintln!("Ciphers: DES, TripleDES, RC2, Rijndael; modes: CBC, ECB, CFB");
    eprintln!("Padding: None, PKCS7, Zeros, ANSIX923, ISO10126");
}

fn fail(context: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("Error {}: {}", context, message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let rest = &args[2..];

    let result = match command.as_str() {
        "hash" => handle_hash(rest),
        "hmac" => handle_hmac(rest),
        "encrypt" => handle_cipher(rest, true),
        "decrypt" => handle_cipher(rest, false),
        "base64" => handle_base64(rest),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        fail(&format!("running {}", command), e);
    }
}

fn require(args: &[String], count: usize, what: &str) {
    if args.len() < count {
        eprintln!("Error: missing {} argument", what);
        print_usage();
        process::exit(1);
    }
}

fn parse_hex(value: &str, what: &str) -> Vec<u8> {
    match hex::decode(value) {
        Ok(bytes) => bytes,
        Err(e) => fail(&format!("parsing {}", what), e),
    }
}

fn open(path: &str) -> BufReader<File> {
    match File::open(path) {
        Ok(f) => BufReader::new(f),
        Err(e) => fail(&format!("opening {}", path), e),
    }
}

fn handle_hash(args: &[String]) -> Result<()> {
    require(args, 2, "file");
    let mut hasher = HashAlgorithm::create(&args[0])?;
    io::copy(&mut open(&args[1]), &mut hasher)?;
    println!("{}  {}", hex::encode(hasher.finish()), args[1]);
    Ok(())
}

fn handle_hmac(args: &[String]) -> Result<()> {
    require(args, 3, "file");
    let kind: HashKind = args[0].parse()?;
    let key = parse_hex(&args[1], "key");
    let mut mac = Hmac::new(kind, &key);
    io::copy(&mut open(&args[2]), &mut mac)?;
    println!("{}  {}", hex::encode(mac.finish()), args[2]);
    Ok(())
}

fn handle_cipher(args: &[String], encrypt: bool) -> Result<()> {
    require(args, 7, "output file");
    let kind: SymmetricKind = args[0].parse()?;
    let key = parse_hex(&args[3], "key");
    let iv = parse_hex(&args[4], "IV");

    let mut alg = SymmetricAlgorithm::new(kind);
    alg.set_mode(args[1].parse()?);
    alg.set_padding(args[2].parse()?);
    if kind == SymmetricKind::Rijndael && !iv.is_empty() {
        alg.set_block_size(iv.len() as u32 * 8)?;
    }
    if !iv.is_empty() {
        alg.set_iv(&iv)?;
    }
    alg.set_key(&key)?;

    let transform = if encrypt {
        alg.create_encryptor()?
    } else {
        alg.create_decryptor()?
    };

    let output = BufWriter::new(File::create(&args[6])?);
    let mut writer = CryptoWriter::new(output, transform);
    io::copy(&mut open(&args[5]), &mut writer)?;
    writer.finish()?;

    println!(
        "{} {} -> {}",
        if encrypt { "Encrypted" } else { "Decrypted" },
        args[5],
        args[6]
    );
    Ok(())
}

fn handle_base64(args: &[String]) -> Result<()> {
    require(args, 1, "file");
    let data = std::fs::read(&args[0])?;
    let encoded = ToBase64Transform::new().transform_final_block(&data)?;
    println!("{}", String::from_utf8_lossy(&encoded));
    Ok(())
}
