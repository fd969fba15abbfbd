use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use futures::future::try_join_all;

use common::crypto::pdp::{build_proof, verify, Challenge, ProofError, StoredSegment, Verdict, VerifyParams};
use common::crypto::{compute_tag, generate_keypair, EntropyError, KeyError, TagError, TagParams};

/// Run one complete audit round locally over a set of files: the owner tags
/// every file as one segment, the holder answers a random challenge and the
/// auditor checks the proof. Nothing is persisted.
#[derive(Args, Debug, Clone)]
pub struct Audit {
    /// Files to audit, each one becomes a segment (indices start at 1)
    #[arg(long = "file", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Challenge round
    #[arg(long, default_value_t = 1)]
    pub round: u64,

    /// Number of segments to challenge (defaults to the config, then all)
    #[arg(long)]
    pub sample: Option<usize>,

    /// Corrupt the holder's copy of this segment before proving
    #[arg(long)]
    pub corrupt: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    #[error("tag error: {0}")]
    Tag(#[from] TagError),
    #[error("proof error: {0}")]
    Proof(#[from] ProofError),
    #[error("tagging task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub struct AuditOutput {
    pub round: u64,
    pub segments: usize,
    pub challenged: Vec<u64>,
    pub verdict: Verdict,
}

impl std::fmt::Display for AuditOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = match self.verdict {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
        };
        writeln!(f, "round:      {}", self.round)?;
        writeln!(f, "segments:   {}", self.segments)?;
        writeln!(f, "challenged: {:?}", self.challenged)?;
        write!(f, "verdict:    {}", verdict)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Audit {
    type Error = AuditError;
    type Output = AuditOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let contents = try_join_all(self.files.iter().map(|path| async move {
            tokio::fs::read(path)
                .await
                .map_err(|e| AuditError::Read(path.clone(), e))
        }))
        .await?;

        // owner: keys and per-file randomness
        let params = ctx.params.clone();
        let (private_key, public_key) = generate_keypair(&params)?;
        let random_v = params.random_within_order()?;
        let random_u = params.random_within_order()?;

        // owner: tag every segment in parallel
        let round = self.round;
        let tasks = contents.into_iter().enumerate().map(|(i, content)| {
            let params = Arc::clone(&params);
            let private_key = private_key.clone();
            let index = i as u64 + 1;
            tokio::task::spawn_blocking(move || -> Result<(u64, StoredSegment), TagError> {
                let tag = compute_tag(
                    &params,
                    &TagParams {
                        content: &content,
                        index,
                        random_v,
                        random_u,
                        private_key,
                        round,
                    },
                )?;
                Ok((index, StoredSegment { tag, content }))
            })
        });
        let mut segments = try_join_all(tasks)
            .await?
            .into_iter()
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        tracing::info!(segments = segments.len(), round, "tagged segments");

        // owner: pick the segments to challenge
        let total = segments.len();
        let sample = self
            .sample
            .or(ctx.config.audit.sample_size)
            .unwrap_or(total)
            .min(total);
        let challenge = {
            let mut rng = rand::rng();
            let mut indices = rand::seq::index::sample(&mut rng, total, sample)
                .into_iter()
                .map(|i| i as u64 + 1)
                .collect::<Vec<_>>();
            indices.sort_unstable();
            Challenge::build(&params, round, random_v, &private_key, &indices, &mut rng)?
        };

        // holder: answer from its (possibly damaged) copy
        if let Some(index) = self.corrupt {
            if let Some(segment) = segments.get_mut(&index) {
                flip_first_byte(&mut segment.content);
                tracing::warn!(index, "corrupted holder copy");
            }
        }
        let proof = build_proof(&params, &challenge, &segments)?;

        // auditor: public data only
        let verify_params = VerifyParams::new(public_key, &challenge, random_u, proof);
        let verdict = verify(&params, &verify_params)?;
        tracing::info!(?verdict, challenged = sample, "audit round finished");

        Ok(AuditOutput {
            round,
            segments: total,
            challenged: challenge.indices(),
            verdict,
        })
    }
}

/// Invert the first byte; an empty segment gains one byte instead
fn flip_first_byte(content: &mut Vec<u8>) {
    match content.first_mut() {
        Some(byte) => *byte ^= 0xff,
        None => content.push(0xff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::op::{Op, OpContext};
    use dtx_app::{AppConfig, AuditConfig};
    use tempfile::TempDir;

    fn write_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("segment-{}", i));
                std::fs::write(&path, format!("content of segment {}", i)).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_honest_holder_passes() {
        let ctx = OpContext::with_config(AppConfig::default(), None);
        let dir = TempDir::new().unwrap();
        let audit = Audit {
            files: write_files(&dir, 4),
            round: 3,
            sample: None,
            corrupt: None,
        };
        let output = audit.execute(&ctx).await.unwrap();
        assert_eq!(output.verdict, Verdict::Accepted);
        assert_eq!(output.challenged, vec![1, 2, 3, 4]);
        assert!(output.to_string().contains("accepted"));
    }

    #[tokio::test]
    async fn test_sample_size_from_config() {
        let config = AppConfig {
            audit: AuditConfig {
                sample_size: Some(2),
            },
            ..AppConfig::default()
        };
        let ctx = OpContext::with_config(config, None);
        let dir = TempDir::new().unwrap();
        let audit = Audit {
            files: write_files(&dir, 5),
            round: 1,
            sample: None,
            corrupt: None,
        };
        let output = audit.execute(&ctx).await.unwrap();
        assert_eq!(output.challenged.len(), 2);
        assert!(output.verdict.is_accepted());
    }

    #[tokio::test]
    async fn test_corrupted_holder_is_caught() {
        let ctx = OpContext::with_config(AppConfig::default(), None);
        let dir = TempDir::new().unwrap();
        let audit = Audit {
            files: write_files(&dir, 3),
            round: 1,
            sample: None,
            corrupt: Some(2),
        };
        let output = audit.execute(&ctx).await.unwrap();
        assert_eq!(output.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_flip_first_byte_keeps_length() {
        let mut content = b"abc".to_vec();
        flip_first_byte(&mut content);
        assert_eq!(content, vec![b'a' ^ 0xff, b'b', b'c']);

        let mut empty = Vec::new();
        flip_first_byte(&mut empty);
        assert_eq!(empty, vec![0xff]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let ctx = OpContext::with_config(AppConfig::default(), None);
        let audit = Audit {
            files: vec![PathBuf::from("/nonexistent/segment")],
            round: 1,
            sample: None,
            corrupt: None,
        };
        assert!(matches!(
            audit.execute(&ctx).await,
            Err(AuditError::Read(_, _))
        ));
    }
}
