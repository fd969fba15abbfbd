use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use common::crypto::PairingParams;
use dtx_app::{AppConfig, ConfigError};

#[derive(Clone)]
pub struct OpContext {
    /// Pairing group setup shared by every audit operation
    pub params: Arc<PairingParams>,
    /// Loaded configuration (defaults if no config file exists)
    pub config: AppConfig,
    /// Optional custom config path (defaults to ~/.dtx)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create context from an optional config path
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = AppConfig::load(config_path.clone())?;
        Ok(Self::with_config(config, config_path))
    }

    pub fn with_config(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            params: Arc::new(PairingParams::new()),
            config,
            config_path,
        }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
