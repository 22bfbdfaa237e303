use clap::{value_parser, Arg, Command};

fn index_arg() -> Arg {
    Arg::new("index")
        .help("Position of the book in the result list, starting at 1")
        .required(true)
        .value_parser(value_parser!(usize))
}

pub fn arg_parser() -> Command {
    Command::new("bookcat")
        .about("Search Google Books from the terminal")
        .multicall(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Search for books matching the given words")
                .arg(
                    Arg::new("query")
                        .num_args(0..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(Command::new("list").about("Show the current result list"))
        .subcommand(
            Command::new("show")
                .about("Show everything known about one result")
                .arg(index_arg()),
        )
        .subcommand(
            Command::new("open")
                .about("Open the preview page of a result in the browser")
                .arg(index_arg()),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
}

pub fn arg_parser_cli() -> Command {
    arg_parser().subcommand(Command::new("repl").about("Launch a read eval print loop"))
}

pub fn arg_parser_repl() -> Command {
    arg_parser().subcommand(Command::new("exit").about("Leave the read eval print loop"))
}

pub fn generate_completions() -> Vec<String> {
    let cmd = arg_parser_repl();
    fn add_command(parent_fn_name: &str, cmd: &Command, subcmds: &mut Vec<String>) {
        let fn_name = format!(
            "{parent_fn_name} {cmd_name}",
            parent_fn_name = parent_fn_name,
            cmd_name = cmd.get_name()
        )
        .trim()
        .to_string();
        subcmds.push(fn_name.clone());
        for subcmd in cmd.get_subcommands() {
            add_command(&fn_name, subcmd, subcmds);
        }
    }
    let mut subcmds = vec![];
    for subcmd in cmd.get_subcommands() {
        add_command("", subcmd, &mut subcmds);
    }
    subcmds.sort();
    subcmds
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn search_collects_words() {
        let matches = arg_parser_repl()
            .try_get_matches_from(["search", "the", "hobbit"])
            .unwrap();
        let (name, matches) = matches.subcommand().unwrap();
        assert_eq!(name, "search");
        let words: Vec<&String> = matches.get_many::<String>("query").unwrap().collect();
        assert_eq!(words, ["the", "hobbit"]);
    }

    #[test]
    fn show_needs_a_number() {
        assert!(arg_parser_repl().try_get_matches_from(["show", "x"]).is_err());
        assert!(arg_parser_repl().try_get_matches_from(["show"]).is_err());
        let matches = arg_parser_repl().try_get_matches_from(["show", "3"]).unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        assert_eq!(matches.get_one::<usize>("index"), Some(&3));
    }

    #[test]
    fn completions_cover_commands() {
        assert_eq!(
            generate_completions(),
            ["config", "exit", "list", "open", "search", "show"]
        );
    }
}
