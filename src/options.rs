use clap::Parser;
use secrecy::SecretString;

#[derive(Debug, Parser)]
#[clap(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Options {
    /// The personal access token used to talk to the Figma API. If not
    /// specified, it is read from the environment variable
    /// 'FIGMA_ACCESS_TOKEN'.
    #[clap(long, env("FIGMA_ACCESS_TOKEN"), hide_env_values(true))]
    pub access_token: Option<SecretString>,

    /// The key of the Figma document to export components from. If not
    /// specified, it is read from the environment variable 'FIGMA_FILE_KEY'.
    #[clap(long, env("FIGMA_FILE_KEY"))]
    pub file_key: Option<String>,

    /// Sets verbosity level. Can be specified multiple times to increase the verbosity
    /// of this program.
    #[clap(long = "verbose", short, action(clap::ArgAction::Count))]
    pub verbosity: u8,
}
