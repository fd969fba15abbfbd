use clap::Args;
use serde::Serialize;

use common::crypto::{generate_keypair, KeyError, PrivateKey, PublicKey};

#[derive(Args, Debug, Clone)]
pub struct Keygen {
    /// Print the keypair as JSON instead of plain lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
    #[serde(skip)]
    json: bool,
}

impl std::fmt::Display for KeygenOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.json {
            let json = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
            return write!(f, "{}", json);
        }
        writeln!(f, "private_key: {}", self.private_key.to_hex())?;
        write!(f, "public_key:  {}", self.public_key.to_hex())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("key generation failed: {0}")]
    Key(#[from] KeyError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Keygen {
    type Error = KeygenError;
    type Output = KeygenOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (private_key, public_key) = generate_keypair(&ctx.params)?;
        Ok(KeygenOutput {
            private_key,
            public_key,
            json: self.json,
        })
    }
}
