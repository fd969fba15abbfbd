use clap::Args;

use common::crypto::{reconstruct, SecretShareError, Share, ShareSet};
use common::curves::Fr;

#[derive(Args, Debug, Clone)]
pub struct Reconstruct {
    /// A share as printed by `dtx split` (`<index>:<hex>`), repeat per share
    #[arg(long = "share", required = true)]
    pub shares: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    #[error("reconstruct failed: {0}")]
    Share(#[from] SecretShareError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Reconstruct {
    type Error = ReconstructError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut shares = ShareSet::<Fr>::new();
        for raw in &self.shares {
            let share: Share<Fr> = raw.parse()?;
            shares.insert(share.index, share.value)?;
        }
        let secret = reconstruct(&shares)?;
        tracing::info!(shares = shares.len(), "reconstructed secret");
        Ok(hex::encode(secret))
    }
}
