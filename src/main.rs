//! # Command Line Interface
//! 
//! The argument layout is in `cli.rs`, the subcommands are in the `commands` module.

mod cli;

use env_logger;
use log::error;
use d88kit::commands;
use d88kit::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let main_cmd = cli::build_cli();
    let matches = main_cmd.clone().get_matches();

    match matches.subcommand() {
        Some(("put-sys",cmd)) => commands::put_sys::put_sys(cmd),
        Some(("get-raw",cmd)) => commands::get_raw::get_raw(cmd),
        Some(("stat",cmd)) => commands::stat::stat(cmd),
        Some(("patch-bios",cmd)) => commands::patch_bios::patch_bios(cmd),
        Some(("completions",cmd)) => commands::completions::generate(main_cmd,cmd),
        _ => {
            error!("No subcommand was found, try `d88kit --help`");
            Err(Box::new(CommandError::InvalidCommand))
        }
    }
}
