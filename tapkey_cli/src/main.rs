use anyhow::{anyhow, Context};
use bitcoin::hex::FromHex;
use clap::{Parser, Subcommand};
use tapkey_core::{
    descriptor, personal_sign_payload, recover_keys, KeyDisplay, KeyEntry, RecoverOutcome,
    Signature, Signer, DERIVATION_PATH,
};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about = "Recover a taproot key from a wallet signature", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    #[arg(short)]
    verbosity: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the candidate keys from a personal_sign signature
    Recover {
        /// Signature as hex, with or without a 0x prefix
        #[arg(value_name = "SIGNATURE")]
        signature: String,
        /// Print the candidates as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute a descriptor checksum, or verify one already present
    Checksum {
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: String,
    },
    /// Print the personal_sign payload to sign in the wallet
    Message,
}

/// The injected signer, realized as a signature the user already produced in
/// their wallet.
struct ProvidedSignature(Option<Signature>);

impl Signer for ProvidedSignature {
    fn request_signature(&mut self, _message: &[u8]) -> Option<Signature> {
        self.0.take()
    }
}

#[derive(Default)]
struct CollectedKeys {
    entries: Vec<KeyEntry>,
}

impl KeyDisplay for CollectedKeys {
    fn show_key(&mut self, key: &KeyEntry) {
        self.entries.push(key.clone());
    }

    fn reset(&mut self) {
        self.entries.clear();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbosity {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Recover { signature, json } => {
            let hex = signature.strip_prefix("0x").unwrap_or(&signature);
            let bytes = Vec::<u8>::from_hex(hex).context("signature is not valid hex")?;
            let mut signer =
                ProvidedSignature((!bytes.is_empty()).then(|| Signature::new(bytes)));
            let mut display = CollectedKeys::default();

            match recover_keys(&mut signer, &mut display) {
                RecoverOutcome::NoSignature => {
                    return Err(anyhow!("signer produced no signature"))
                }
                RecoverOutcome::Recovered(_) => {}
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&display.entries)?);
            } else {
                for (i, entry) in display.entries.iter().enumerate() {
                    let which = if i == 0 { "primary" } else { "alternate" };
                    println!("{which} key ({DERIVATION_PATH}):");
                    println!("  hex:        {}", entry.hex);
                    println!("  wif:        {}", entry.wif);
                    println!("  descriptor: {}", entry.descriptor);
                }
                if display.entries.len() > 1 {
                    println!(
                        "the signer's recovery byte convention is ambiguous; \
                         check which key your funds are on"
                    );
                }
            }
        }
        Command::Checksum { descriptor } => {
            println!("{}", descriptor::checked(&descriptor)?);
        }
        Command::Message => {
            println!("{}", personal_sign_payload());
        }
    }

    Ok(())
}
