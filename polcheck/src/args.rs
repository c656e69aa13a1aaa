//! Arguments for the polcheck utility

use clap::Parser;

/// Policy checker (polcheck)
#[derive(Parser, Debug, Default)]
#[command(arg_required_else_help(true))]
#[clap(author, version, about, long_about = None)]
pub struct PolcheckArgs {
    /// Full path and filename of a binary DER-encoded or PEM-encoded certificate to evaluate.
    #[clap(short = 'e', long, help_heading = "TARGETS")]
    pub target: Option<String>,

    /// Full path and filename of a message whose body carries PEM-encoded certificates. The first
    /// certificate is evaluated and the others are used as intermediate CA certificates.
    #[clap(short, long, help_heading = "TARGETS")]
    pub message: Option<String>,

    /// Full path of folder containing trust anchors. Overrides the psTrustAnchorFolder setting.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub ta_folder: Option<String>,

    /// Full path of folder containing intermediate CA certificates. Overrides the
    /// psCertificationAuthorityFolder setting.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub ca_folder: Option<String>,

    /// Full path and filename of JSON-formatted file containing policy settings.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub settings: Option<String>,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See <https://docs.rs/log4rs/latest/log4rs/> for details.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub logging_config: Option<String>,

    /// Full path and filename of JSON-formatted policy tree applied to each target certificate.
    #[clap(short, long, help_heading = "POLICIES")]
    pub policy: Option<String>,

    /// Full path and filename of JSON-formatted chain policy applied to each certificate from the
    /// target to a trust anchor. Requires a trust anchor folder.
    #[clap(long, help_heading = "POLICIES")]
    pub chain_policy: Option<String>,

    /// Emit verdicts as JSON instead of text.
    #[clap(short, long, help_heading = "OUTPUT")]
    pub json: bool,

    /// List the extension kinds that policy leaves may name, then exit.
    #[clap(long, help_heading = "OUTPUT")]
    pub list_kinds: bool,
}
