use super::{collect::CollectErrorKind, evaluate::EvaluateErrorKind, install::InstallErrorKind, overrides::OverrideErrorKind};

/// Any failure of [`crate::Bridge::build_and_install`]
#[derive(thiserror::Error, Debug)]
pub enum BridgeErrorKind {
    #[error(transparent)]
    Collect(#[from] CollectErrorKind),
    #[error(transparent)]
    Override(#[from] OverrideErrorKind),
    #[error(transparent)]
    Evaluate(#[from] EvaluateErrorKind),
    #[error(transparent)]
    Install(#[from] InstallErrorKind),
}
