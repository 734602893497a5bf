use clap::Parser;

pub mod handlers;

const HELP_TEMPLATE: &str = "\
<title>{name}</title> {version}
{about}

<title>USAGE:</title>
    <cmd>jbrecent</cmd> <hl><COMMAND></hl> [ARGS...]

<title>COMMANDS:</title>
    <cmd>projects</cmd> [QUERY] [--product CODE] [--json]   List recent projects, open ones first
    <cmd>products</cmd> [--json]                            List installed IDE builds
    <cmd>shell</cmd> <hl><CODE></hl>                                  Print the launcher for a product code
    <cmd>open</cmd> <hl><QUERY></hl> [--product CODE] [--admin]       Open a recent project in its IDE
    <cmd>last</cmd>                                         Show each IDE's last opened project
    <cmd>config</cmd> [--path]                              Show the settings file

<dim>Run `jbrecent <COMMAND> --help` for the options of a command.
Set RUST_LOG=debug to see what is scanned and why entries are skipped.</dim>
";

/// Builds the color-aware help string at runtime.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = HELP_TEMPLATE
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// jbrecent: recent JetBrains projects, one command away.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command to run. Defaults to `projects`.
    pub command: Option<String>,

    /// Arguments handed to the command's own parser.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
