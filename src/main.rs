//! IronWallet 主入口
//!
//! 生成比特币 HD 钱包地址（BIP49/BIP84/BIP86），以表格或 JSON 输出

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ironwallet::config::NetworkRegistry;
use ironwallet::domain::{AddressScheme, HdWallet};
use ironwallet::service::{derive_rows, AddressRow, BatchRequest};

#[derive(Parser)]
#[command(
    name = "ironwallet",
    version,
    about = "Generate bitcoin wallet addresses (BIP49/BIP84/BIP86)"
)]
struct Cli {
    /// BIP39 mnemonic phrase; a fresh 24-word phrase is generated when omitted
    #[arg(long)]
    mnemonic: Option<String>,

    /// BIP39 password phrase
    #[arg(long, default_value = "")]
    pass: String,

    /// Target network (mainnet, testnet, regtest)
    #[arg(long, default_value = "mainnet")]
    network: String,

    /// Number of addresses per scheme
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Export uncompressed keys (witness schemes will reject these)
    #[arg(long)]
    uncompressed: bool,

    /// Emit JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SchemeReport {
    standard: &'static str,
    description: &'static str,
    rows: Vec<AddressRow>,
}

#[derive(Serialize)]
struct WalletReport {
    network: String,
    mnemonic: String,
    password: String,
    seed: String,
    root_key: String,
    schemes: Vec<SchemeReport>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironwallet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let registry = NetworkRegistry::new();
    let params = registry.resolve(&cli.network)?;

    let wallet = HdWallet::new(params.network, cli.pass.clone(), cli.mnemonic.as_deref())?;
    let master = wallet.master_key()?;

    let mut schemes = Vec::new();
    for scheme in AddressScheme::ALL {
        let mut req = BatchRequest::bitcoin(scheme, cli.count);
        req.compress = !cli.uncompressed;

        let rows = derive_rows(&wallet, &req, params)?;
        schemes.push(SchemeReport {
            standard: scheme.standard(),
            description: scheme.description(),
            rows,
        });
    }

    if cli.json {
        let report = WalletReport {
            network: params.name.clone(),
            mnemonic: wallet.mnemonic(),
            password: wallet.password().to_string(),
            seed: hex::encode(wallet.seed()),
            root_key: master.to_string(),
            schemes,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Bitcoin network: {}", params.name);
    println!("BIP39 Mnemonic: {}", wallet.mnemonic());
    println!("BIP39 Password: {}", wallet.password());
    println!("BIP39 Seed: {}", hex::encode(wallet.seed()));
    println!("BIP32 Root Key: {}", master);

    for scheme in &schemes {
        render_table(scheme);
    }

    Ok(())
}

fn render_table(scheme: &SchemeReport) {
    let path_header = format!("Path {}", scheme.standard);
    let path_width = scheme
        .rows
        .iter()
        .map(|r| r.path.len())
        .chain([path_header.len()])
        .max()
        .unwrap_or(0);
    let addr_width = scheme
        .rows
        .iter()
        .map(|r| r.address.len())
        .chain([scheme.description.len()])
        .max()
        .unwrap_or(0);

    println!();
    println!("{} address", scheme.standard);
    println!(
        "{:<path_width$}  {:<addr_width$}  {}",
        path_header, scheme.description, "WIF (Wallet Import Format)"
    );
    for row in &scheme.rows {
        println!(
            "{:<path_width$}  {:<addr_width$}  {}",
            row.path, row.address, row.wif
        );
    }
}
