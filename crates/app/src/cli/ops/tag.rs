use std::path::PathBuf;

use clap::Args;

use common::crypto::{compute_tag, KeyError, PrivateKey, TagError, TagParams};
use common::curves::Fr;

#[derive(Args, Debug, Clone)]
pub struct TagSegment {
    /// Owner private key (hex)
    #[arg(long)]
    pub secret_key: String,

    /// Segment index within the file
    #[arg(long)]
    pub index: u64,

    /// Per-file random V (hex, big-endian)
    #[arg(long)]
    pub v: String,

    /// Public random U (hex, big-endian)
    #[arg(long)]
    pub u: String,

    /// Challenge round the tag is bound to
    #[arg(long)]
    pub round: u64,

    /// Segment content
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum TagSegmentError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid scalar for --{0}: {1}")]
    InvalidScalar(&'static str, String),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("tag error: {0}")]
    Tag(#[from] TagError),
}

pub(crate) fn parse_scalar(flag: &'static str, hex: &str) -> Result<Fr, TagSegmentError> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let bytes = hex::decode(hex).map_err(|e| TagSegmentError::InvalidScalar(flag, e.to_string()))?;
    common::crypto::scalar_from_bytes(&bytes)
        .map_err(|e| TagSegmentError::InvalidScalar(flag, e.to_string()))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for TagSegment {
    type Error = TagSegmentError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let private_key = PrivateKey::from_hex(&self.secret_key)?;
        let random_v = parse_scalar("v", &self.v)?;
        let random_u = parse_scalar("u", &self.u)?;
        let content = tokio::fs::read(&self.file)
            .await
            .map_err(|e| TagSegmentError::Read(self.file.clone(), e))?;

        let tag = compute_tag(
            &ctx.params,
            &TagParams {
                content: &content,
                index: self.index,
                random_v,
                random_u,
                private_key,
                round: self.round,
            },
        )?;
        tracing::info!(index = self.index, round = self.round, bytes = content.len(), "tagged segment");
        Ok(tag.to_hex())
    }
}
