use std::{env, path::PathBuf, process::exit};

use anyhow::Result;
use clap::ArgMatches;
use dotenvy::dotenv;
use reedline::Signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod browser;
mod command_parser;
mod prompt;
mod repl;

use bookcat::{
    config::Config,
    error::QueryError,
    session::{Session, Update},
    state::SearchCache,
    thumbnail::{SlotState, ThumbnailLoader},
    traits::DisplayTerminal,
    types::{book::Book, text::Text},
};

struct App {
    config:      Config,
    session:     Session,
    thumbnails:  Option<ThumbnailLoader>,
    state_path:  PathBuf,
    interactive: bool,
}

impl App {
    fn new(config: Config, interactive: bool) -> Result<Self> {
        let mut session = Session::from_config(&config)?;
        let state_path = config.state_path()?;
        match SearchCache::load(&state_path) {
            Ok(cache) => session.restore(cache),
            Err(e) => warn!("Starting without saved results: {e}"),
        }
        let thumbnails = (interactive && config.load_thumbnails)
            .then(|| ThumbnailLoader::new(session.fetcher().clone()));
        let mut app = Self {
            config,
            session,
            thumbnails,
            state_path,
            interactive,
        };
        app.load_thumbnails();
        Ok(app)
    }

    fn load_thumbnails(&mut self) {
        if let (Some(loader), Some(books)) = (self.thumbnails.as_mut(), self.session.books()) {
            loader.show(books);
        }
    }

    fn notice(&self, message: impl ToString) {
        println!("{}", self.config.output_notice.format_str(message));
    }

    /// Look up the book named by the 1-based `index` argument
    fn book(&self, matches: &ArgMatches) -> Result<(usize, &Book)> {
        let index = *matches
            .get_one::<usize>("index")
            .ok_or_else(|| anyhow::anyhow!("Missing result number"))?;
        let book = index
            .checked_sub(1)
            .and_then(|i| self.session.book(i))
            .ok_or_else(|| anyhow::anyhow!("There is no result number {index}"))?;
        Ok((index, book))
    }

    async fn handle_command(&mut self, command: String) -> Result<()> {
        let args = command_parser::arg_parser_repl();
        let command = match shlex::split(&command) {
            Some(command) => command,
            None => anyhow::bail!("Invalid command"),
        };
        let matches = args.try_get_matches_from(command)?;
        match matches.subcommand() {
            Some(("search", matches)) => {
                let words: Vec<String> = matches
                    .get_many::<String>("query")
                    .map(|words| words.cloned().collect())
                    .unwrap_or_default();
                let text = if words.is_empty() && self.interactive {
                    match Text::create_by_prompt_skippable("Search for:")? {
                        Some(text) => text.0,
                        None => return Ok(()),
                    }
                } else {
                    words.join(" ")
                };
                self.search(&text).await?;
            }
            Some(("list", _)) => self.print_list(),
            Some(("show", matches)) => {
                if let Some(loader) = self.thumbnails.as_mut() {
                    loader.drain();
                }
                let (index, book) = self.book(matches)?;
                println!("{}", self.render_full(index, book));
            }
            Some(("open", matches)) => {
                let (_, book) = self.book(matches)?;
                info!("Opening {}", book.preview_url);
                browser::open(&book.preview_url)?;
            }
            Some(("config", _)) => {
                println!("{}", Config::default_as_string()?);
            }
            Some(("exit", _)) => {
                exit(0);
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        }
        Ok(())
    }

    async fn search(&mut self, text: &str) -> Result<()> {
        match self.session.search(text).await {
            Ok(Update::Replaced(_)) => {
                if let Err(e) = self.session.cache().save(&self.state_path) {
                    error!("Couldn't save session to {}: {e}", self.state_path.display());
                }
                self.load_thumbnails();
                self.print_list();
            }
            // Already logged by the session; the list on display stays.
            Ok(Update::Failed(_)) | Ok(Update::Stale) => {}
            Err(QueryError::EmptyQuery) => self.notice(QueryError::EmptyQuery),
            Err(e) => error!("{e}"),
        }
        Ok(())
    }

    fn print_list(&self) {
        match self.session.books() {
            None => self.notice("No results yet, try `search <words>`"),
            Some([]) => self.notice("No books found"),
            Some(books) => {
                for (i, book) in books.iter().enumerate() {
                    println!(
                        "{} {}",
                        self.config.output_index.format_str(i + 1),
                        book.fmt_to_string(&self.config)
                    );
                    println!();
                }
            }
        }
    }

    fn render_full(&self, index: usize, book: &Book) -> String {
        let thumbnail = match (self.thumbnails.as_ref(), book.image_url.as_ref()) {
            (_, None) => "none".to_string(),
            (None, Some(url)) => url.clone(),
            (Some(loader), Some(url)) => match loader.board().get(index - 1) {
                Some(SlotState::Loaded(thumbnail)) => format!("{thumbnail} ({url})"),
                Some(SlotState::Loading) | None => format!("loading ({url})"),
            },
        };
        [
            format!(
                "{} {}",
                self.config.output_index.format_str(index),
                book.fmt_to_string(&self.config)
            ),
            self.config.output_preview.format_str(&book.preview_url),
            self.config.output_thumbnail.format_str(thumbnail),
        ]
        .join("\n")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BOOKCAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args_parsed = command_parser::arg_parser_cli().get_matches_from(env::args_os().skip(1));
    let config = Config::read_config()?;

    if let Some(("repl", _)) = args_parsed.subcommand() {
        let history_path = config.history_path()?;
        let mut app = App::new(config, true)?;
        let mut repl = repl::Repl::new(command_parser::generate_completions(), history_path)?;
        loop {
            let signal = repl.read_line();
            if let Some(loader) = app.thumbnails.as_mut() {
                loader.drain();
            }
            match signal {
                Ok(Signal::Success(buffer)) => {
                    if buffer.trim().is_empty() {
                        continue;
                    }
                    if let Err(e) = app.handle_command(buffer).await {
                        println!("{}", app.config.output_error.format_str(e));
                    }
                }
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                    println!("\nAborted!");
                    break;
                }
                #[allow(unreachable_patterns)]
                Ok(x) => {
                    println!("Event: {:?}", x);
                }
                Err(e) => {
                    error!("{e}");
                    break;
                }
            }
        }
    } else {
        let mut app = App::new(config, false)?;
        let args = env::args_os()
            .skip(1)
            .map(|x| x.to_string_lossy().into_owned())
            .map(|x| shlex::try_quote(&x).map(|x| x.into_owned()))
            .collect::<Result<Vec<String>, _>>()?
            .join(" ");
        app.handle_command(args).await?;
    }

    Ok(())
}
