use anyhow::{Context, Result};
use libp2p::identity::Keypair;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load_or_generate_keypair<P: AsRef<Path>>(path: P) -> Result<Keypair> {
    let path = path.as_ref();
    if path.exists() {
        info!("Loading node key from {:?}", path);
        let bytes = fs::read(path).with_context(|| format!("failed to read node key {:?}", path))?;
        let keypair = Keypair::from_protobuf_encoding(&bytes).context("malformed node key")?;
        Ok(keypair)
    } else {
        info!("Generating new node key at {:?}", path);
        let keypair = Keypair::generate_ed25519();
        let bytes = keypair.to_protobuf_encoding()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(keypair)
    }
}
