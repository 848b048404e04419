use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const GROUPS_HELP: &str = "comma delimited list of allocation groups in hex,
the payload fills them in the order given, e.g. `29,2A,2B,2C`";
const GEOMETRY_HELP: &str = "the flat image has the same number of equally sized sectors on every track,
sectors that are missing from a track read as zeros";

fn dimg_arg(req: bool) -> Arg {
    Arg::new("dimg").short('d').long("dimg").help("path to D88 disk image")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(req)
}

fn output_arg(help: &'static str) -> Arg {
    Arg::new("output").short('o').long("output").help(help)
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(false)
}

fn indent_arg() -> Arg {
    Arg::new("indent").long("indent").help("JSON indentation, omit to minify")
        .value_name("SPACES")
        .value_parser(value_parser!(u16).range(0..16))
        .required(false)
}

fn geometry_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("sector-size").long("sector-size").help("bytes per flat sector")
            .value_name("BYTES")
            .value_parser(value_parser!(u16).range(128..=8192))
            .default_value("256"))
        .arg(Arg::new("sectors").long("sectors").help("sectors per flat track")
            .value_name("COUNT")
            .value_parser(value_parser!(u8).range(1..))
            .default_value("16"))
        .arg(Arg::new("reserved").long("reserved").help("tracks preceding group 0")
            .value_name("TRACKS")
            .value_parser(value_parser!(u8).range(0..=164))
            .default_value("2"))
        .arg(Arg::new("group-sectors").long("group-sectors").help("sectors per allocation group")
            .value_name("COUNT")
            .value_parser(value_parser!(u8).range(1..))
            .default_value("8"))
}

pub fn build_cli() -> Command {
    let long_help = "d88kit is always invoked with exactly one of several subcommands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
replace CPM.SYS:       `d88kit put-sys -d cpm.d88 -f CPM.SYS -o cpm_new.d88`
flat image:            `d88kit get-raw -d cpm.d88 -o cpm.raw`
inspect image:         `d88kit stat -d cpm.d88 --indent 4`
patch BIOS:            `d88kit patch-bios -s CPM.SYS -b BIOS.BIN -o CPM_NEW.SYS`";

    let mut main_cmd = Command::new("d88kit")
        .about("Replaces the CP/M system file on D88 disk images.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        geometry_args(Command::new("put-sys")
            .arg(dimg_arg(true))
            .arg(Arg::new("file").short('f').long("file").help("path to new system file")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .arg(output_arg("path of modified image, default is to overwrite the source"))
            .arg(Arg::new("groups").short('g').long("groups").help("allocation groups to replace")
                .value_name("LIST")
                .long_help(GROUPS_HELP)
                .value_delimiter(',')
                .default_value("29,2A,2B,2C")))
            .about("replace the system file (CPM.SYS) inside a D88 image")
            .after_help(GEOMETRY_HELP)
    );
    main_cmd = main_cmd.subcommand(
        geometry_args(Command::new("get-raw")
            .arg(dimg_arg(true))
            .arg(output_arg("path of flat image, omit to write to stdout"))
            .arg(Arg::new("console").long("console").help("allow binary output to the console")
                .action(ArgAction::SetTrue)))
            .about("write the flat logical image of a D88 image")
            .after_help(GEOMETRY_HELP)
    );
    main_cmd = main_cmd.subcommand(
        Command::new("stat")
            .arg(dimg_arg(true))
            .arg(indent_arg())
            .about("write D88 header and track layout as JSON to stdout")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("patch-bios")
            .arg(Arg::new("sys").short('s').long("sys").help("path to CPM.SYS")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .arg(Arg::new("bios").short('b').long("bios").help("path to custom BIOS")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .arg(output_arg("path of patched system file").default_value("CPM_patched.SYS"))
            .arg(Arg::new("offset").long("offset").help("offset of the BIOS in hex")
                .value_name("HEX")
                .default_value("1600"))
            .about("replace the BIOS at the end of a flat CPM.SYS")
            .after_help("the original tail of CPM.SYS is discarded, the result is padded to 128 bytes")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(
                Arg::new("shell").short('s').long("shell").help("shell target").value_name("NAME")
                    .required(true)
                    .value_parser(["bash","elv","fish","ps1","zsh"])
            )
            .about("write completions script to stdout for the specified shell")
    );
    return main_cmd;
}
