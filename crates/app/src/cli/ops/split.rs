use clap::Args;

use common::crypto::{split, split_with_commitments, SecretShareError};
use common::curves::G1Projective;

#[derive(Args, Debug, Clone)]
pub struct Split {
    /// Secret to split (hex, read as a big-endian integer)
    #[arg(long)]
    pub secret: String,

    /// Number of shares to produce (default from config)
    #[arg(long)]
    pub total: Option<usize>,

    /// Shares needed to recover the secret (default from config)
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Also print Feldman commitments over BLS12-381 G1
    #[arg(long)]
    pub commitments: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("invalid secret hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("split failed: {0}")]
    Share(#[from] SecretShareError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Split {
    type Error = SplitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret = hex::decode(self.secret.strip_prefix("0x").unwrap_or(&self.secret))?;
        let total = self.total.unwrap_or(ctx.config.sharing.total);
        let threshold = self.threshold.unwrap_or(ctx.config.sharing.threshold);

        let mut lines = Vec::new();
        if self.commitments {
            let (shares, commitments) =
                split_with_commitments::<G1Projective>(&secret, total, threshold)?;
            lines.extend(shares.to_shares().iter().map(|share| share.to_string()));
            lines.push(String::new());
            lines.push("commitments:".to_string());
            lines.extend(
                commitments
                    .to_hex()
                    .into_iter()
                    .enumerate()
                    .map(|(j, point)| format!("  C{}: {}", j, point)),
            );
        } else {
            let shares = split::<G1Projective>(&secret, total, threshold)?;
            lines.extend(shares.to_shares().iter().map(|share| share.to_string()));
        }

        tracing::info!(total, threshold, "split secret");
        Ok(lines.join("\n"))
    }
}
