use clap::Subcommand;

use self::run::RunArgs;

mod run;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the reference bench scenario against the counter model
    Run(RunArgs),
}

pub trait Run {
    fn run(&self) -> anyhow::Result<()>;
}

impl Commands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Run(args) => args.run(),
        }
    }
}
